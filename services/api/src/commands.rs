use clap::Args;
use fleet_checklists::access::{authorize, AccessContext, AccessProfile, Action, Decision};
use fleet_checklists::checklists::targeting::roster::load_snapshot;
use fleet_checklists::checklists::{
    invalid_template_payload, resolve_assignments, DeploymentMode, TargetingOverrides,
    TargetingResolution, TemplateDocument, TemplateId, TemplateValidator, ValidationFailure,
    ValidationLimits,
};
use fleet_checklists::error::AppError;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct ValidateArgs {
    /// Template document (JSON) to validate
    pub(crate) path: PathBuf,
    /// Maximum template name length in characters
    #[arg(long)]
    pub(crate) name_max_chars: Option<usize>,
    /// Maximum item hint length in characters
    #[arg(long)]
    pub(crate) hint_max_chars: Option<usize>,
}

#[derive(Args, Debug)]
pub(crate) struct AssignmentsArgs {
    /// Template document (JSON) to resolve
    pub(crate) template: PathBuf,
    /// Vehicle roster export with `id,vehicle_type` columns
    #[arg(long)]
    pub(crate) vehicles: PathBuf,
    /// User roster export with an `id` column
    #[arg(long)]
    pub(crate) users: PathBuf,
    /// Assignment axis: vehicle_user, vehicle or user
    #[arg(long, default_value = "vehicle_user", value_parser = parse_mode)]
    pub(crate) mode: DeploymentMode,
    /// Print only the assignments that apply
    #[arg(long)]
    pub(crate) applying_only: bool,
}

#[derive(Args, Debug)]
pub(crate) struct AuthorizeArgs {
    /// Access profile document (JSON)
    pub(crate) profile: PathBuf,
    /// Action to evaluate, e.g. `approve_or_reject`
    #[arg(long)]
    pub(crate) action: String,
    /// Evaluate as the owner of the inspection record
    #[arg(long)]
    pub(crate) owner: bool,
}

fn parse_mode(raw: &str) -> Result<DeploymentMode, String> {
    DeploymentMode::parse(raw)
        .ok_or_else(|| format!("unknown mode '{raw}', expected vehicle_user, vehicle or user"))
}

pub(crate) fn run_validate(args: ValidateArgs) -> Result<(), AppError> {
    let defaults = ValidationLimits::default();
    let validator = TemplateValidator::new(ValidationLimits {
        name_max_chars: args.name_max_chars.unwrap_or(defaults.name_max_chars),
        hint_max_chars: args.hint_max_chars.unwrap_or(defaults.hint_max_chars),
    });

    let raw = fs::read_to_string(&args.path)?;
    match validator.validate_json(&raw) {
        Ok(template) => {
            println!("Template '{}' is valid", template.name);
            println!(
                "  areas: {} | items: {} | settings: {}",
                template.structure.len(),
                template.item_count(),
                template.settings.enabled_flags().join(", ")
            );
            print_json(&TemplateDocument::from(&template))
        }
        Err(ValidationFailure::Invalid(errors)) => {
            print_json(&invalid_template_payload(&errors))?;
            Err(AppError::Invalid(errors))
        }
        Err(err) => Err(err.into()),
    }
}

pub(crate) fn run_assignments(args: AssignmentsArgs) -> Result<(), AppError> {
    let raw = fs::read_to_string(&args.template)?;
    let template = TemplateValidator::default().validate_json(&raw)?;
    let fleet = load_snapshot(&args.vehicles, &args.users)?;

    let mut resolution = resolve_assignments(
        &template_id_for(&args.template),
        &template,
        &fleet,
        &TargetingOverrides::default(),
        args.mode,
    );
    if args.applying_only {
        resolution.assignments.retain(|assignment| assignment.applies);
    }

    print_resolution_summary(&resolution, args.mode);
    print_json(&resolution)
}

#[derive(Debug, Serialize)]
struct AuthorizeOutput<'a> {
    profile: &'a str,
    action: Action,
    #[serde(flatten)]
    decision: Decision,
}

pub(crate) fn run_authorize(args: AuthorizeArgs) -> Result<(), AppError> {
    let raw = fs::read_to_string(&args.profile)?;
    let profile: AccessProfile = serde_json::from_str(&raw)?;
    let action: Action = args.action.parse()?;
    let context = if args.owner {
        AccessContext::owner()
    } else {
        AccessContext::third_party()
    };

    let decision = authorize(&profile, action, &context);
    print_json(&AuthorizeOutput {
        profile: profile.id.0.as_str(),
        action,
        decision,
    })
}

/// Previews are not stored, so the template is named after its file.
fn template_id_for(path: &Path) -> TemplateId {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "preview".to_string());
    TemplateId::new(stem)
}

fn print_resolution_summary(resolution: &TargetingResolution, mode: DeploymentMode) {
    println!(
        "Resolved {} assignment(s) in {} mode, {} applying",
        resolution.assignments.len(),
        mode.label(),
        resolution.applying().count()
    );
    for warning in &resolution.warnings {
        println!("  warning: {warning}");
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
