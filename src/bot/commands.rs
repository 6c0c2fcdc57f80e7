use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot")]
    Start,

    #[command(description = "Show this help")]
    Help,

    #[command(description = "Register: /register <email> <password>")]
    Register(String),

    #[command(description = "Log in: /login <email> <password>")]
    Login(String),

    #[command(description = "Log out")]
    Logout,

    #[command(description = "Quote an asset: /stock <ticker>")]
    Stock(String),

    #[command(description = "Choose daily digest categories")]
    Subscriptions,

    #[command(description = "Track price moves: /track <ticker> [threshold%|remove]")]
    Track(String),

    #[command(description = "Subscribe to news: /news <query>")]
    News(String),
}
