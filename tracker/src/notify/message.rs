//! Alert message rendering (Telegram Markdown)

use crate::{
    pipeline::TokenSnapshot,
    utils::{format_percent, format_thousands},
};

use super::AlertDetails;

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "✅ YES"
    } else {
        "❌ NO"
    }
}

/// Escape characters that legacy Telegram Markdown would interpret
fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '_' | '*' | '`' | '[' | ']') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Render the alert text for one qualifying token
pub fn render(snapshot: &TokenSnapshot, details: &AlertDetails) -> String {
    let lock_pct = snapshot.locked_liquidity_pct.round(1).with_scale(1);

    format!(
        "🚨 *New launch detected* 🚨\n\
         \n\
         • Token: [{symbol}]({url})\n\
         • Market Cap: ${mcap} ↗️ (+${delta} since last cycle)\n\
         • Liquidity: ${liq} ({lock_pct}% locked)\n\
         • Volume: ${volume}/24h\n\
         • Holders: {holders} 👥\n\
         • Supply: {supply} 💰\n\
         \n\
         ⚠️ *Checklist:*\n\
         - Dex Paid: {dex_paid}\n\
         - Dev Sold: {dev_sold}\n\
         - Top 10: {top10} (Max {max_top10})\n\
         - Dev Holding: {dev_holding} (Max {max_dev_holding})",
        symbol = escape_markdown(&snapshot.symbol),
        url = snapshot.url,
        mcap = format_thousands(&snapshot.market_cap),
        delta = format_thousands(&snapshot.mcap_delta),
        liq = format_thousands(&snapshot.liquidity),
        volume = format_thousands(&snapshot.volume_24h),
        holders = snapshot.holder_count,
        supply = format_thousands(&snapshot.total_supply),
        dex_paid = yes_no(details.dex_paid),
        dev_sold = yes_no(details.dev_sold),
        top10 = format_percent(&details.top10_holder_share),
        max_top10 = format_percent(&details.max_top10),
        dev_holding = format_percent(&details.dev_holding_share),
        max_dev_holding = format_percent(&details.max_dev_holding),
    )
}
