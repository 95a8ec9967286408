//! # Utility Commands
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use serenity::builder::CreateApplicationCommand;

pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![create_ping_command()]
}

fn create_ping_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("ping")
        .description("Check that Mechamaru is listening");
    command
}
