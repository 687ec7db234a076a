//! Interactive prompts.
//!
//! Credentials, the save-session question and project selection. Nothing
//! here exits the process; dismissing a prompt returns an error.

use dialoguer::{Confirm, Input, Password, Select};

use crate::error_handling::ImportError;
use crate::hive::ProjectSummary;
use crate::session::Credentials;

/// Asks for login, password and an optional MFA token.
pub fn prompt_credentials() -> Result<Credentials, ImportError> {
    let login: String = Input::new().with_prompt("Login").interact_text()?;
    let password = Password::new().with_prompt("Password").interact()?;
    let use_mfa = Confirm::new()
        .with_prompt("Enter an MFA token?")
        .default(false)
        .interact()?;
    let mfa_token = if use_mfa {
        Input::new().with_prompt("MFA token").interact_text()?
    } else {
        String::new()
    };

    Ok(Credentials {
        login,
        password,
        mfa_token,
    })
}

/// Asks whether the new session should be written to disk.
pub fn confirm_save_session() -> Result<bool, ImportError> {
    Ok(Confirm::new()
        .with_prompt("Save the session to a file?")
        .default(false)
        .interact()?)
}

/// Labels shown in the project menu.
pub fn project_labels(projects: &[ProjectSummary]) -> Vec<String> {
    projects
        .iter()
        .enumerate()
        .map(|(idx, project)| format!("{}. {}", idx + 1, project.display_path()))
        .collect()
}

/// Lets the operator pick one of the editable projects.
///
/// # Errors
///
/// `ImportError::NoProjects` for an empty list, `NoProjectSelected` when the
/// menu is dismissed.
pub fn select_project(projects: &[ProjectSummary]) -> Result<String, ImportError> {
    if projects.is_empty() {
        return Err(ImportError::NoProjects);
    }
    let choice = Select::new()
        .with_prompt("Select the project to import into")
        .items(&project_labels(projects))
        .default(0)
        .interact_opt()?
        .ok_or(ImportError::NoProjectSelected)?;
    Ok(projects[choice].project_id.to_string())
}
