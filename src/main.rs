use clap::Parser;
use std::process;
use wp2org::{Cli, OutputFormatter, OutputMode, Wp2Org, Wp2OrgError, UserFriendlyError};

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let app = match Wp2Org::from_cli(&cli) {
        Ok(app) => app,
        Err(e) => {
            print_startup_error(&e);
            return exit_code_for(&e);
        }
    };

    if cli.check_converter {
        return handle_check_converter(&app);
    }

    let Some(in_file) = cli.in_file.as_deref() else {
        app.output_formatter().error("No input file given");
        return 1;
    };

    match app.convert_file(in_file) {
        Ok(report) => {
            app.output_formatter().print_render_summary(&report);
            0
        }
        Err(e) => {
            app.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &Wp2OrgError) -> i32 {
    match error {
        Wp2OrgError::Cancelled => 130, // Interrupted (SIGINT)
        Wp2OrgError::Config { .. } => 2,
        Wp2OrgError::XmlParse { .. } => 3,
        Wp2OrgError::Conversion { .. } | Wp2OrgError::ConverterUnavailable { .. } => 4,
        Wp2OrgError::InputNotFound { .. } => 5,
        _ => 1,
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "wp2org.toml".to_string());

    match Wp2Org::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  wp2org <wordpress.xml> --config {}", config_path);
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_check_converter(app: &Wp2Org) -> i32 {
    let formatter = app.output_formatter();
    let converter = &app.config().converter;

    match app.check_converter() {
        Ok(version) => {
            formatter.success(&format!("{} is available: {}", converter.program, version));
            0
        }
        Err(e) => {
            formatter.print_user_friendly_error(&e);
            exit_code_for(&e)
        }
    }
}

fn print_startup_error(error: &Wp2OrgError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}
