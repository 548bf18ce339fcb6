use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use super::render;
use crate::app::{App, View};

const PUBLIC_HELP: &str = "\
submit      Book an appointment (fill in the lead form)
calendar    Show availability
refresh     Reload the calendar
freelancer  I am the freelancer (log in)
quit        Exit";

const LOGIN_HELP: &str = "\
login       Enter username and password
back        Return to the public page
quit        Exit";

const DASHBOARD_HELP: &str = "\
leads       Show all leads
calendar    Show the full calendar
refresh     Reload leads and calendar
logout      Log out
quit        Exit";

enum Flow {
    Continue,
    Quit,
}

pub async fn run(app: &mut App) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    app.start().await?;
    println!("{}", help(app.view()));

    loop {
        if let Some(notice) = app.take_notice() {
            println!("{}", notice);
        }

        let readline = rl.readline(&format!("{}> ", app.view()));
        match readline {
            Ok(line) => {
                let command = line.trim();
                if command.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(command);

                match dispatch(app, &mut rl, command).await {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Quit) => break,
                    Err(err) => println!("Error: {}", err),
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}

async fn dispatch(app: &mut App, rl: &mut DefaultEditor, command: &str) -> Result<Flow> {
    match (app.view(), command) {
        (_, "quit" | "exit") => return Ok(Flow::Quit),
        (view, "help") => println!("{}", help(view)),

        (View::Public, "submit") => submit(app, rl).await?,
        (View::Public, "freelancer") => {
            app.request_login()?;
            println!("{}", LOGIN_HELP);
        }

        (View::Login, "login") => login(app, rl).await?,
        (View::Login, "back") => {
            app.back().await?;
            println!("{}", render_calendar(app));
        }

        (View::Authenticated, "leads") => {
            let roster = app.roster();
            println!("{}", render::roster(&roster.leads(), &roster.status()));
        }
        (View::Authenticated, "logout") => {
            app.logout().await?;
            println!("Logged out");
        }

        (View::Public | View::Authenticated, "calendar") => println!("{}", render_calendar(app)),
        (View::Public | View::Authenticated, "refresh") => {
            app.refresh().await;
            println!("{}", render_current(app));
        }

        (view, other) => println!("Unknown command '{}'. Try:\n{}", other, help(view)),
    }

    Ok(Flow::Continue)
}

/// Prompt for each field, keeping what was typed last time as the default
/// so a failed submit can be retried.
async fn submit(app: &mut App, rl: &mut DefaultEditor) -> Result<()> {
    let previous = app.form().clone();
    let form = app.form_mut();
    form.name = ask(rl, "Name*", &previous.name)?;
    form.email = ask(rl, "Email*", &previous.email)?;
    form.phone = ask(rl, "Phone", &previous.phone)?;
    form.notes = ask(rl, "Notes", &previous.notes)?;
    form.requested_start = ask(rl, "Preferred time (YYYY-MM-DD HH:MM)", &previous.requested_start)?;
    form.duration_minutes = ask(rl, "Duration in minutes", &previous.duration_minutes)?;

    // The outcome is reported through the status line
    let _ = app.submit_lead().await;
    println!("Status: {}", app.submission_status());

    Ok(())
}

async fn login(app: &mut App, rl: &mut DefaultEditor) -> Result<()> {
    let username = ask(rl, "Username", "")?;
    let password = ask(rl, "Password", "")?;

    if app.login(&username, &password).await.is_err() {
        if let Some(message) = app.login_error() {
            println!("{}", message);
        }
        return Ok(());
    }

    println!("Logged in");
    println!("{}", DASHBOARD_HELP);

    Ok(())
}

fn ask(rl: &mut DefaultEditor, label: &str, initial: &str) -> Result<String> {
    let line = rl.readline_with_initial(&format!("{}: ", label), (initial, ""))?;
    Ok(line)
}

fn render_calendar(app: &App) -> String {
    let calendar = app.calendar();
    render::calendar(&calendar.events(), calendar.mode(), &calendar.status())
}

/// Everything the current view lists, after a refresh.
fn render_current(app: &App) -> String {
    if app.view() != View::Authenticated {
        return render_calendar(app);
    }
    let roster = app.roster();
    let calendar = app.calendar();
    render::dashboard(
        &roster.leads(),
        &roster.status(),
        &calendar.events(),
        &calendar.status(),
    )
}

fn help(view: View) -> &'static str {
    match view {
        View::Public => PUBLIC_HELP,
        View::Login => LOGIN_HELP,
        View::Authenticated => DASHBOARD_HELP,
        View::Loading => "quit        Exit",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_lists_commands_for_each_view() {
        assert!(help(View::Public).contains("freelancer"));
        assert!(help(View::Login).contains("back"));
        assert!(help(View::Authenticated).contains("logout"));
        assert!(!help(View::Public).contains("leads"));
    }
}
