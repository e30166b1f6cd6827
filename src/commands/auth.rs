use crate::args::{LoginArgs, RegisterArgs};
use crate::commands::{settle, start, start_logged_in, Out};
use crate::model::User;
use crate::{Config, Mode, Result};
use anyhow::bail;

/// Logs in, stores the credential in the fin home directory and shows the dashboard.
pub async fn login(config: &Config, mode: Mode, args: &LoginArgs) -> Result<Out<User>> {
    let mut app = start(config, mode).await?;
    let ok = app.login(args.email(), args.password()).await;
    settle(&mut app, ok)?;
    let user = app.session().and_then(|s| s.user()).cloned();
    let out = match user {
        Some(user) => Out::new(format!("Logged in as {}", user.email), user),
        None => Out::new_message("Logged in"),
    };
    Ok(out.with_view(app.screen()))
}

/// Creates an account. If the API returns a credential the new account is logged in too.
pub async fn register(config: &Config, mode: Mode, args: &RegisterArgs) -> Result<Out<User>> {
    let mut app = start(config, mode).await?;
    let ok = app
        .register(args.name(), args.email(), args.password())
        .await;
    settle(&mut app, ok)?;
    let out = match app.session().and_then(|s| s.user()).cloned() {
        Some(user) => Out::new(format!("Registered and logged in as {}", user.email), user),
        None => Out::new_message(format!("Registered {}, now run 'fin login'", args.email())),
    };
    Ok(out.with_view(app.screen()))
}

/// Removes the stored credential. Succeeds when nobody was logged in.
pub async fn logout(config: &Config, mode: Mode) -> Result<Out<()>> {
    let mut app = start(config, mode).await?;
    if app.session().is_none() {
        return Ok("Nobody was logged in".into());
    }
    let ok = app.logout().await;
    settle(&mut app, ok)?;
    Ok(Out::new_message("").with_view(app.screen()))
}

/// Validates the stored credential against the API and prints the user it belongs to.
pub async fn whoami(config: &Config, mode: Mode) -> Result<Out<User>> {
    let app = start_logged_in(config, mode).await?;
    let Some(user) = app.session().and_then(|s| s.user()).cloned() else {
        bail!("The API did not say who you are")
    };
    let line = format!("{} <{}>\n", user.display_name(), user.email);
    Ok(Out::new("", user).with_view(line))
}
