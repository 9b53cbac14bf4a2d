//! Config command handler: show effective configuration.

use anyhow::Result;

use super::Context;

pub fn run_config_show_command(ctx: &Context) -> Result<()> {
    let settings = &ctx.settings;
    let path = ctx.config_path.as_ref().map_or_else(
        || "<unresolved>".to_string(),
        |path| path.display().to_string(),
    );
    println!("config_path = {path}");
    println!("api_url = {}", settings.api_url);
    println!("email = {}", settings.email.as_deref().unwrap_or("<unset>"));
    println!("name = {}", settings.name.as_deref().unwrap_or("<unset>"));
    println!("token_env = {}", settings.token_env);
    println!("loan_days = {}", settings.loan_days);
    println!("connect_timeout_secs = {}", settings.connect_timeout_secs);
    println!("read_timeout_secs = {}", settings.read_timeout_secs);
    println!("tick_ms = {}", settings.tick.as_millis());
    Ok(())
}
