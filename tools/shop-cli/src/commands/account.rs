//! Login, signup, logout and whoami.

use anyhow::{bail, Result};
use dialoguer::{Input, Password};
use serde_json::json;
use shop_sdk::prelude::*;

use super::{LoginArgs, SignupArgs};
use crate::context::Context;

/// Run the login command.
pub async fn login(args: LoginArgs, ctx: &Context) -> Result<()> {
    let (shop, _) = ctx.open().await?;

    let email = match args.email {
        Some(email) => email,
        None => Input::<String>::new().with_prompt("Email").interact_text()?,
    };
    let password = match args.password {
        Some(password) => password,
        None => Password::new().with_prompt("Password").interact()?,
    };

    let spinner = ctx.output.spinner("Signing in...");
    let result = shop.session().login(&email, &password).await;
    spinner.finish_and_clear();
    let user = result?;

    if user.provisional {
        ctx.output
            .warn("Signed in, but the profile could not be loaded; showing token details");
    }
    if ctx.output.is_json() {
        ctx.output.json(&user);
    } else {
        ctx.output
            .success(&format!("Signed in as {}", user.user.display_name()));
    }
    Ok(())
}

/// Run the signup command.
pub async fn signup(args: SignupArgs, ctx: &Context) -> Result<()> {
    let (shop, _) = ctx.open().await?;

    let password = Password::new().with_prompt("Password").interact()?;
    let confirm = Password::new().with_prompt("Confirm password").interact()?;

    let mut form = SignUpForm::new(args.email, password, confirm, args.name);
    if let Some(phone) = args.phone {
        form = form.with_phone(phone);
    }
    form.validate()?;

    let spinner = ctx.output.spinner("Creating account...");
    let result = match args.admin_code {
        Some(code) => shop.session().admin_sign_up(AdminSignUpForm::new(form, code)).await,
        None => shop.session().sign_up(form).await,
    };
    spinner.finish_and_clear();
    result?;

    ctx.output.success("Account created. Run `shop login` to sign in.");
    Ok(())
}

/// Run the logout command.
pub async fn logout(ctx: &Context) -> Result<()> {
    let (shop, _) = ctx.open().await?;
    if !shop.session().is_authenticated() {
        ctx.output.info("Not signed in");
    }
    // Clears local state even when already signed out.
    shop.session().logout();
    ctx.output.success("Signed out; cart cleared");
    Ok(())
}

/// Run the whoami command.
pub async fn whoami(ctx: &Context) -> Result<()> {
    let (shop, _) = ctx.open().await?;
    let Some(user) = shop.session().current_user() else {
        if ctx.output.is_json() {
            ctx.output.json(&json!({ "authenticated": false }));
            return Ok(());
        }
        bail!("Not signed in. Run `shop login` first.");
    };

    if ctx.output.is_json() {
        ctx.output.json(&user);
        return Ok(());
    }

    ctx.output.header("Account");
    ctx.output.kv("ID", user.id().as_str());
    ctx.output.kv("Email", &user.user.email);
    ctx.output.kv("Name", user.user.display_name());
    ctx.output.kv("Role", user.user.role.as_str());
    if user.provisional {
        ctx.output.kv("Profile", "from token only");
    }
    Ok(())
}
