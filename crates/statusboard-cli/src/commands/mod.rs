pub mod account;
pub mod reports;

use statusboard_application::AppContext;
use statusboard_infrastructure::ConfigService;

use crate::output::OutputMode;
use crate::{Commands, Toggle};

pub async fn run(
    context: &AppContext,
    config_service: &ConfigService,
    command: Commands,
    mode: OutputMode,
) -> anyhow::Result<()> {
    match command {
        Commands::List { mine } => reports::list(context, mine, mode).await,
        Commands::Show { id } => reports::show(context, &id, mode).await,
        Commands::New(fields) => reports::create(context, fields, mode).await,
        Commands::Edit { id, fields } => reports::edit(context, &id, fields, mode).await,
        Commands::Delete { id } => reports::delete(context, &id).await,
        Commands::Summary { id } => reports::summary(context, &id, mode).await,
        Commands::Export { id } => reports::export(context, &id).await,
        Commands::Share { id } => reports::share(context, &id).await,
        Commands::Dashboard => reports::dashboard(context, mode).await,
        Commands::History => reports::history(context, mode).await,
        Commands::Whoami => account::whoami(context, mode),
        Commands::Role { role } => account::role(context, role),
        Commands::Profile { name, email } => account::profile(context, name, email),
        Commands::SignIn {
            name,
            email,
            password,
            provider,
        } => account::sign_in(context, name, email, password, provider).await,
        Commands::SignUp { email, password } => {
            account::sign_up(context, &email, &password).await
        }
        Commands::SignOut => account::sign_out(context).await,
        Commands::Persist { state } => {
            reports::persist(context, config_service, state == Toggle::On).await
        }
    }
}
