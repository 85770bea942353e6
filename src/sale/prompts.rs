//! User-facing message text

use super::effect::{Choice, Prompt};
use super::event::UserProfile;
use super::quote::{format_fiat, format_rate, AmountLimits, RateTable};
use super::state::{FiatCurrency, Network, PaymentMethod};
use crate::processor::DepositAddress;

/// Escape the characters legacy Telegram Markdown treats as markup
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub fn welcome(profile: &UserProfile) -> Prompt {
    Prompt::markdown(format!(
        "Hello {}!\n\n\
         Welcome to the USDT Seller Bot. I can help you sell your USDT for fiat currencies.\n\n\
         To begin, please tap the /sell command or select it from the menu.",
        escape_markdown(&profile.display_name())
    ))
}

pub fn admin_alert(profile: &UserProfile) -> String {
    format!(
        "🔔 New User Alert!\n\nName: {}\nUsername: @{}\nUser ID: {}",
        profile.display_name(),
        profile.username.as_deref().unwrap_or("N/A"),
        profile.user_id
    )
}

pub fn rate_board(rates: &RateTable) -> Prompt {
    let lines: Vec<String> = FiatCurrency::ALL
        .iter()
        .map(|fiat| format!("*1 USDT ≈ {} {}*", format_rate(rates.rate(*fiat)), fiat))
        .collect();
    Prompt::markdown(format!(
        "Here are our current buying rates (including our premium):\n\n{}",
        lines.join("\n")
    ))
}

pub fn fiat_choice() -> Prompt {
    let row: Vec<Choice> = FiatCurrency::ALL
        .iter()
        .map(|fiat| Choice::new(fiat.label(), fiat.token()))
        .collect();
    Prompt::plain("Which currency would you like to receive?").with_choices(vec![row])
}

pub fn network_choice() -> Prompt {
    let rows: Vec<Vec<Choice>> = Network::ALL
        .iter()
        .map(|network| vec![Choice::new(network.label(), network.code())])
        .collect();
    Prompt::plain("Please choose the network for your USDT deposit:").with_choices(rows)
}

pub fn amount_request(limits: &AmountLimits) -> Prompt {
    Prompt::markdown(format!(
        "Please enter the amount of USDT you want to sell.\n\nMinimum: *{} USDT*\nMaximum: *{} USDT*",
        limits.min, limits.max
    ))
}

pub fn invalid_amount(limits: &AmountLimits) -> Prompt {
    Prompt::plain(format!(
        "❌ Invalid amount. Please enter a number between {} and {}.",
        limits.min, limits.max
    ))
}

pub fn quote(payout: f64, fiat: FiatCurrency) -> Prompt {
    Prompt::markdown(format!(
        "You will receive approximately *{} {}*.",
        format_fiat(payout),
        fiat
    ))
}

pub fn payment_method_choice() -> Prompt {
    let rows: Vec<Vec<Choice>> = PaymentMethod::ALL
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|method| Choice::new(method.label(), method.token()))
                .collect::<Vec<_>>()
        })
        .collect();
    Prompt::plain("How would you like to receive your payment?").with_choices(rows)
}

pub fn payment_details_request(method: PaymentMethod) -> Prompt {
    Prompt::plain(method.instructions())
}

pub fn generating_address() -> Prompt {
    Prompt::plain("⏳ Thank you. Generating your deposit address, please wait...")
}

pub fn deposit_instructions(deposit: &DepositAddress, network: Network) -> Prompt {
    Prompt::markdown(format!(
        "✅ *Deposit Address Generated!*\n\n\
         Please send exactly *{amount} {network}* to the following address:\n\n\
         `{address}`\n\n\
         Your transaction ID is `{txn_id}`.\n\n\
         Once your deposit is confirmed, we will process your fiat payment. \
         This transaction will be valid for *{hours} hours* (until {expires} UTC).",
        amount = deposit.amount,
        network = network,
        address = deposit.address,
        txn_id = deposit.txn_id,
        hours = deposit.validity_hours(),
        expires = deposit.expires_at.format("%Y-%m-%d %H:%M"),
    ))
}

pub const QR_CAPTION: &str = "You can also scan this QR code.";

pub fn deposit_failed() -> Prompt {
    Prompt::plain(
        "❌ An error occurred while generating the deposit address. \
         Please try again later by typing /start.",
    )
}

pub fn cancelled() -> Prompt {
    Prompt::plain("Your sale has been cancelled. Type /sell to start again.")
}
