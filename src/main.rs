use std::path::PathBuf;

use clap::Parser as _;
use roast_report::{
    access::{AccessPolicy, Allowance, Plan, PlanState, UserIdentity},
    error::ContextError,
    extract::{extract_text, UploadLimits},
    logo::Logo,
    render_report_from_json, PageGeometry,
};

#[derive(clap::Parser, Debug)]
#[command(version, about, long_about = None)]
struct CliArguments {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Render a stored roast record into a PDF report.
    Render {
        /// The path of the JSON roast record.
        #[arg(short = 'r', long = "record", value_name = "json_file")]
        record_path: PathBuf,
        /// The path of the output PDF file.
        #[arg(short = 'o', long = "output", value_name = "pdf_file")]
        output_pdf_path: PathBuf,
        /// A PNG or JPEG logo drawn at the top of the first page.
        #[arg(short = 'l', long = "logo", value_name = "image_file")]
        logo_path: Option<PathBuf>,
        /// A JSON file overriding the default page geometry.
        #[arg(short = 'g', long = "geometry", value_name = "json_file")]
        geometry_path: Option<PathBuf>,
    },
    /// Print the plain text of a PDF or DOCX resume.
    Extract {
        #[arg(short = 'f', long = "file", value_name = "resume_file")]
        resume_path: PathBuf,
    },
    /// Tell whether a user may start a new roast.
    Allowance {
        #[arg(short = 'e', long = "email")]
        email: Option<String>,
        #[arg(short = 'p', long = "plan", default_value = "free")]
        plan: Plan,
        /// The number of roasts already completed by the user.
        #[arg(short = 'c', long = "completed", default_value_t = 0)]
        completed_reports: usize,
    },
}

fn main() {
    env_logger::init();
    if let Err(error) = fallible_main() {
        log::error!("{}", error);
        std::process::exit(1);
    }
}

fn fallible_main() -> Result<(), ContextError> {
    let arguments = CliArguments::parse();
    log::debug!("{:?}", arguments);

    match arguments.command {
        Command::Render {
            record_path,
            output_pdf_path,
            logo_path,
            geometry_path,
        } => {
            let record_bytes = std::fs::read(&record_path).map_err(|error| {
                ContextError::with_error(
                    format!("Failed to read the roast record {:?}", record_path),
                    &error,
                )
            })?;
            let geometry = match geometry_path {
                Some(geometry_path) => PageGeometry::from_path(&geometry_path)?,
                None => PageGeometry::default(),
            };
            let logo = logo_path.as_deref().and_then(Logo::load_or_skip);

            let rendered_report = render_report_from_json(&record_bytes, &geometry, logo.as_ref())
                .map_err(|error| ContextError::with_error("Failed to render the roast", &error))?;
            std::fs::write(&output_pdf_path, &rendered_report.bytes).map_err(|error| {
                ContextError::with_error(
                    format!("Failed to write the report to {:?}", output_pdf_path),
                    &error,
                )
            })?;
            log::info!(
                "Saved {} to the path: {:?}",
                rendered_report.filename,
                output_pdf_path
            );
        }
        Command::Extract { resume_path } => {
            let file_bytes = std::fs::read(&resume_path).map_err(|error| {
                ContextError::with_error(format!("Failed to read the resume {:?}", resume_path), &error)
            })?;
            let filename = resume_path
                .file_name()
                .map(|filename| filename.to_string_lossy().into_owned())
                .unwrap_or_default();
            let extracted_resume = extract_text(&file_bytes, &filename, &UploadLimits::default())
                .map_err(|error| ContextError::with_error("Failed to extract the resume text", &error))?;
            println!("{}", extracted_resume.text);
        }
        Command::Allowance {
            email,
            plan,
            completed_reports,
        } => {
            let access_policy = AccessPolicy::from_env();
            let user = UserIdentity { email };
            let plan_state = PlanState {
                plan,
                completed_reports,
            };
            match access_policy.allowance(&user, &plan_state) {
                Allowance::Allowed => println!("allowed"),
                Allowance::Denied(reason) => println!("denied: {}", reason),
            }
        }
    }

    Ok(())
}
