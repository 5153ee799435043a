//! Cart inspection and mutation commands.

use anyhow::{Context as _, Result};
use turbo_cart::{CartChange, CartStore, NewCartItem, ProductId};
use turbo_storage::KvStore;

use super::{AddArgs, ItemArgs, ListArgs};
use crate::context::Context;
use crate::output::{format_price, Output};

/// Run the list command.
pub async fn list(args: ListArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_cart().await?;
    if args.count {
        let total = store.items().total_quantity();
        if ctx.output.is_json() {
            ctx.output.json(&serde_json::json!({ "count": total }));
        } else {
            println!("{}", total);
        }
        return Ok(());
    }
    print_cart(&store, &ctx.output);
    Ok(())
}

/// Run the add command.
pub async fn add(args: AddArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_cart().await?;
    let id = args.id.clone();
    let change = add_item(&store, args).await?;
    report(&id, change, &ctx.output);
    print_cart(&store, &ctx.output);
    Ok(())
}

/// Run the increment command.
pub async fn increment(args: ItemArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_cart().await?;
    let id = ProductId::new(args.id);
    let change = store
        .increment(&id)
        .await
        .with_context(|| format!("Failed to increment {}", id))?;
    report(id.as_str(), change, &ctx.output);
    print_cart(&store, &ctx.output);
    Ok(())
}

/// Run the decrement command.
pub async fn decrement(args: ItemArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_cart().await?;
    let id = ProductId::new(args.id);
    let change = store
        .decrement(&id)
        .await
        .with_context(|| format!("Failed to decrement {}", id))?;
    report(id.as_str(), change, &ctx.output);
    print_cart(&store, &ctx.output);
    Ok(())
}

async fn add_item<S: KvStore>(store: &CartStore<S>, args: AddArgs) -> Result<CartChange> {
    let item = NewCartItem::new(args.id, args.title, args.image_url, args.price);
    let id = item.id.clone();
    store
        .add_to_cart(item)
        .await
        .with_context(|| format!("Failed to add {}", id))
}

fn report(id: &str, change: CartChange, output: &Output) {
    match change {
        CartChange::Added => output.success(&format!("Added {}", id)),
        CartChange::Incremented { quantity } | CartChange::Decremented { quantity } => {
            output.success(&format!("{} quantity is now {}", id, quantity))
        }
        CartChange::Removed => output.success(&format!("Removed {}", id)),
        CartChange::Unchanged => output.warn(&format!("{} is not in the cart", id)),
    }
}

fn print_cart<S: KvStore>(store: &CartStore<S>, output: &Output) {
    let cart = store.items();

    if output.is_json() {
        output.json(cart.items());
        return;
    }

    output.header("Cart");
    if cart.is_empty() {
        output.info("The cart is empty.");
        return;
    }

    let widths = [16, 32, 10, 8];
    output.table_row(&["ID", "TITLE", "PRICE", "QTY"], &widths);
    for item in cart.iter() {
        let price = format_price(item.price);
        let quantity = item.quantity.to_string();
        output.table_row(&[item.id.as_str(), &item.title, &price, &quantity], &widths);
    }
    output.info("");
    output.info(&format!(
        "{} item(s), {} unit(s)",
        cart.len(),
        cart.total_quantity()
    ));
}
