//! Read-mostly resource commands.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use storedesk_core::models::{AnalysisRange, Notification, PageRequest};

use super::{explain, load_config, open_console};

pub async fn stores(page: u32, limit: u32) -> Result<()> {
    let console = open_console(&load_config()?)?;
    let listing = console
        .stores(PageRequest::new(page, limit))
        .await
        .map_err(explain)?;

    for store in &listing.stores {
        let address = store
            .address
            .as_ref()
            .map(|a| a.formatted())
            .unwrap_or_default();
        println!("{}  {}  {}", store.id, store.name, address);
    }
    if listing.pagination.has_more() {
        println!("(more on page {})", page.max(1) + 1);
    }
    Ok(())
}

pub async fn inventory(page: u32, limit: u32) -> Result<()> {
    let console = open_console(&load_config()?)?;
    let listing = console
        .inventory(PageRequest::new(page, limit))
        .await
        .map_err(explain)?;

    for item in &listing.products {
        let quantity = item
            .inventory
            .quantity
            .map(|q| q.to_string())
            .unwrap_or_else(|| "-".into());
        let flag = if item.is_low_stock() { "  LOW" } else { "" };
        println!(
            "{}  {}  qty {}{}",
            item.product_id.as_deref().unwrap_or("?"),
            item.name,
            quantity,
            flag
        );
    }
    if let Some(total) = listing.pagination.total {
        println!("{} products in total", total);
    }
    Ok(())
}

pub async fn coupons() -> Result<()> {
    let console = open_console(&load_config()?)?;
    for coupon in console.coupons().await.map_err(explain)? {
        println!(
            "{}  off {}  min {}  expires {}  {}",
            coupon.coupon_code,
            coupon.off_value.unwrap_or_default(),
            coupon.min_value.unwrap_or_default(),
            coupon.expiry.as_deref().unwrap_or("never"),
            if coupon.is_active { "active" } else { "inactive" }
        );
    }
    Ok(())
}

pub async fn cashbacks() -> Result<()> {
    let console = open_console(&load_config()?)?;
    for cashback in console.cashbacks().await.map_err(explain)? {
        println!(
            "{} back on {}+  {}  {}",
            cashback.cashback_amount,
            cashback.min_purchase_amount,
            cashback.description,
            if cashback.is_active { "active" } else { "inactive" }
        );
    }
    Ok(())
}

pub async fn notify(title: String, body: String) -> Result<()> {
    let console = open_console(&load_config()?)?;
    let response = console
        .notify(&Notification::new(title, body))
        .await
        .map_err(explain)?;
    println!("{}", response.message().unwrap_or("Notification sent"));
    Ok(())
}

pub async fn analysis(from: NaiveDate, to: NaiveDate) -> Result<()> {
    let range = AnalysisRange::new(from, to)?;
    let console = open_console(&load_config()?)?;
    let data = console.analysis(&range).await.map_err(explain)?;
    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}

pub async fn report(date: Option<NaiveDate>) -> Result<()> {
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let console = open_console(&load_config()?)?;
    let report = console.store_report(date).await.map_err(explain)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
