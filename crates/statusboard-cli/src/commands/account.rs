use anyhow::{Result, bail};

use statusboard_application::AppContext;
use statusboard_core::identity::{ChangeOutcome, Role, UserProfile};

use crate::output::{self, OutputMode};

pub fn whoami(context: &AppContext, mode: OutputMode) -> Result<()> {
    let accounts = context.accounts();
    output::whoami(&accounts.current(), accounts.permissions(), mode)
}

pub fn role(context: &AppContext, role: Role) -> Result<()> {
    if context.accounts().set_role(role) == ChangeOutcome::Applied {
        println!("Role set to {role}");
    }
    Ok(())
}

pub fn profile(context: &AppContext, name: String, email: String) -> Result<()> {
    context
        .accounts()
        .update_profile(UserProfile::new(name, email));
    Ok(())
}

pub async fn sign_in(
    context: &AppContext,
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    provider: Option<String>,
) -> Result<()> {
    let accounts = context.accounts();
    if let Some(provider) = provider {
        accounts.sign_in_with_provider(&provider).await?;
        println!(
            "Sign-in with {provider} started; it completes at {}",
            context.config().auth_callback_url()
        );
        return Ok(());
    }

    match (password, email) {
        (Some(password), Some(email)) => {
            accounts.sign_in_with_password(&email, &password).await?;
        }
        (Some(_), None) => bail!("--password requires --email"),
        (None, email) => {
            accounts.sign_in(name.as_deref(), email.as_deref())?;
        }
    }
    Ok(())
}

pub async fn sign_up(context: &AppContext, email: &str, password: &str) -> Result<()> {
    context.accounts().sign_up_with_password(email, password).await?;
    Ok(())
}

pub async fn sign_out(context: &AppContext) -> Result<()> {
    context.accounts().sign_out().await?;
    Ok(())
}
