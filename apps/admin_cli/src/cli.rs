use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use shared::domain::{OutlineStatus, PerformedBy};

#[derive(Parser, Debug)]
#[command(name = "srs-admin", about = "Administer the SRS school records server")]
pub struct Cli {
    /// Overrides srs.toml and the NEXT_PUBLIC_SRS_SERVER / SRS_SERVER env vars.
    #[arg(long, global = true)]
    pub server_url: Option<String>,
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(subcommand)]
    Students(StudentCommand),
    #[command(subcommand)]
    Teachers(TeacherCommand),
    #[command(subcommand)]
    Departments(DepartmentCommand),
    #[command(subcommand)]
    Courses(CourseCommand),
    #[command(subcommand)]
    Schedules(ScheduleCommand),
    #[command(subcommand)]
    Outlines(OutlineCommand),
    #[command(subcommand)]
    Activities(ActivityCommand),
}

#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    pub id: String,
    /// Skip the confirmation prompt.
    #[arg(long)]
    pub yes: bool,
}

#[derive(Subcommand, Debug)]
pub enum StudentCommand {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long)]
        student_id: Option<String>,
        #[arg(long = "class")]
        class_name: Option<String>,
    },
    Add {
        #[arg(long)]
        draft: PathBuf,
    },
    Update {
        id: String,
        #[arg(long)]
        draft: PathBuf,
    },
    Delete(DeleteArgs),
    /// Bulk import from an .xlsx/.xls sheet.
    Import { file: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum TeacherCommand {
    List {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        department: Option<String>,
    },
    Delete(DeleteArgs),
}

#[derive(Subcommand, Debug)]
pub enum DepartmentCommand {
    List,
    Add { name: String },
    Delete(DeleteArgs),
}

#[derive(Subcommand, Debug)]
pub enum CourseCommand {
    List {
        #[arg(long)]
        active: bool,
    },
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        code: String,
        #[arg(long)]
        department: String,
        #[arg(long, default_value = "")]
        prerequisites: String,
        #[arg(long)]
        description: String,
    },
    Delete(DeleteArgs),
}

#[derive(Subcommand, Debug)]
pub enum ScheduleCommand {
    List {
        #[arg(long = "class")]
        class_name: Option<String>,
        #[arg(long)]
        section: Option<String>,
    },
    Add {
        #[arg(long)]
        draft: PathBuf,
    },
    Delete(DeleteArgs),
}

#[derive(Subcommand, Debug)]
pub enum OutlineCommand {
    List {
        #[arg(long)]
        teacher: String,
        #[arg(long)]
        status: Option<OutlineStatus>,
        #[arg(long)]
        course: Option<String>,
    },
    Submit {
        #[arg(long)]
        teacher: String,
        #[arg(long)]
        course: String,
        /// URL of the uploaded outline document.
        #[arg(long)]
        document: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ActivityCommand {
    List {
        #[arg(long)]
        perform_by: Option<PerformedBy>,
    },
}
