use clap::{Args, Parser, Subcommand};
use users_core::config::BASE_URL_ENV;
use users_core::view::DEFAULT_PAGE_SIZE;
use users_core::UserFields;

#[derive(Parser, Debug)]
#[command(name = "users-cli")]
#[command(about = "Browse and manage users through the users REST API", long_about = None)]
#[command(version)]
pub struct Cli {
    /// API base URL, e.g. http://localhost:3001/api
    #[arg(long, global = true, env = BASE_URL_ENV)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show one page of users
    #[command(alias = "ls")]
    List {
        /// Page number, starting at 1
        #[arg(long, short, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,

        /// Entries per page
        #[arg(long, short, default_value_t = DEFAULT_PAGE_SIZE, value_parser = clap::value_parser!(u32).range(1..))]
        limit: u32,

        /// Search by email
        #[arg(long, short)]
        query: Option<String>,
    },

    /// Show a single user
    Get { id: String },

    /// Create a user
    Create(FieldArgs),

    /// Update a user; only the given fields change
    Update {
        id: String,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Delete a user
    #[command(alias = "rm")]
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct FieldArgs {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    /// Date of birth, YYYY-MM-DD
    #[arg(long)]
    pub birthday: Option<String>,

    #[arg(long)]
    pub password: Option<String>,
}

impl From<FieldArgs> for UserFields {
    fn from(args: FieldArgs) -> Self {
        UserFields {
            name: args.name,
            email: args.email,
            birthday: args.birthday,
            password: args.password,
        }
    }
}
