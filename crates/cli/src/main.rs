//! Extra Mile CLI - browse the catalog, manage the cart, place orders.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! xm-cli categories
//! xm-cli products --category 7
//! xm-cli products --search "pickle"
//! xm-cli product 10
//!
//! # Cart
//! xm-cli cart add 10 --quantity 2
//! xm-cli cart set-qty 10 5
//! xm-cli cart remove 10
//! xm-cli cart show
//!
//! # Checkout and orders
//! xm-cli checkout --first-name Rahim --last-name Uddin \
//!     --email rahim@example.com --phone 01700000000 \
//!     --address "12 Lake Road" --city Dhaka --state Dhaka --postcode 1207
//! xm-cli orders list
//! xm-cli orders show 727
//! xm-cli orders reconcile
//! ```
//!
//! Configuration comes from the environment (or a `.env` file); see
//! `extramile_storefront::config`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use extramile_storefront::config::StorefrontConfig;
use extramile_storefront::{App, AppError};

mod commands;

#[derive(Parser)]
#[command(name = "xm-cli")]
#[command(author, version, about = "Extra Mile storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List product categories
    Categories,
    /// List products
    Products {
        /// Restrict to one category
        #[arg(short, long)]
        category: Option<i64>,

        /// Free-text search term
        #[arg(short, long)]
        search: Option<String>,

        /// 1-based page number
        #[arg(short, long)]
        page: Option<u32>,
    },
    /// Show one product
    Product {
        /// Product ID
        id: i64,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order from the cart
    Checkout {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        state: String,
        #[arg(long)]
        postcode: String,
        /// ISO country code
        #[arg(long, default_value = "BD")]
        country: String,
    },
    /// Inspect and maintain order history
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart contents and totals
    Show,
    /// Add a product to the cart
    Add {
        /// Product ID
        product_id: i64,

        /// Units to add (minimum 1)
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        product_id: i64,
    },
    /// Set a line item's quantity (0 removes the line)
    SetQty {
        /// Product ID
        product_id: i64,

        /// New quantity
        quantity: u32,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List cached orders (refreshes quietly against the server)
    List,
    /// Show one order with its line items
    Show {
        /// Order ID
        id: i64,
    },
    /// Verify every cached order against the server and report the result
    Reconcile,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("{}", e.user_message());
        tracing::debug!(error = %e, "Command failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = StorefrontConfig::from_env()?;
    let app = App::new(config).await;

    match cli.command {
        Commands::Categories => commands::catalog::categories(&app).await?,
        Commands::Products {
            category,
            search,
            page,
        } => commands::catalog::products(&app, category, search, page).await?,
        Commands::Product { id } => commands::catalog::product(&app, id).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&app).await,
            CartAction::Add {
                product_id,
                quantity,
            } => commands::cart::add(&app, product_id, quantity).await?,
            CartAction::Remove { product_id } => commands::cart::remove(&app, product_id).await,
            CartAction::SetQty {
                product_id,
                quantity,
            } => commands::cart::set_quantity(&app, product_id, quantity).await,
            CartAction::Clear => commands::cart::clear(&app).await,
        },
        Commands::Checkout {
            first_name,
            last_name,
            email,
            phone,
            address,
            city,
            state,
            postcode,
            country,
        } => {
            commands::checkout::place(
                &app,
                extramile_storefront::checkout::CustomerInfo {
                    first_name,
                    last_name,
                    email,
                    phone,
                    address,
                    city,
                    state,
                    postcode,
                    country,
                },
            )
            .await?;
        }
        Commands::Orders { action } => match action {
            OrdersAction::List => commands::orders::list(&app).await,
            OrdersAction::Show { id } => commands::orders::show(&app, id).await?,
            OrdersAction::Reconcile => commands::orders::reconcile(&app).await,
        },
    }
    Ok(())
}
