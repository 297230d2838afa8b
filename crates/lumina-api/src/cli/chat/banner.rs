//! Welcome banner display for chat sessions.

use console::style;

/// What the banner reports about the session.
pub struct BannerInfo<'a> {
    pub model: &'a str,
    pub context: bool,
    pub durable: bool,
    pub restored: usize,
}

/// Print the welcome banner at the start of a chat session.
pub fn print_welcome_banner(info: &BannerInfo<'_>) {
    let on_off = |on: bool| {
        if on {
            style("on").green()
        } else {
            style("off").yellow()
        }
    };

    println!();
    println!("  {} {}", "*", style("Lumina").cyan().bold());
    println!("  {}", style("Ask questions about the codebase in this directory").dim());
    println!();
    println!("  {}    {}", style("Model:").bold(), style(info.model).dim());
    println!("  {}  {}", style("Context:").bold(), on_off(info.context));
    println!("  {}  {}", style("History:").bold(), on_off(info.durable));
    if info.restored > 0 {
        println!(
            "  {} {}",
            style("Restored:").bold(),
            style(format!("{} messages", info.restored)).dim()
        );
    }
    println!();
    println!("  {}", style("Type /help for commands, Ctrl+D to exit").dim());
    println!("  {}", style("---").dim());
    println!();
}
