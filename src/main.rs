use clap::{Arg, ArgAction, Command as ClapCommand};
use log::error;
use std::process;

// Import from the library
use slidecrop::commands::{CommandFactory, SlidecropCommandFactory};
use slidecrop::utils::logger::Logger;

fn main() {
    let matches = ClapCommand::new("slidecrop")
        .version("0.1")
        .about("Extract the specimen region from pyramidal slide images, dropping the black border")
        .arg(
            Arg::new("input")
                .help("Input pyramidal image file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output image file (lossless PNG)")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("quality")
                .short('q')
                .long("quality")
                .help("Output quality 1-100 (accepted for compatibility; PNG output is lossless)")
                .value_name("N")
                .default_value("80")
                .required(false),
        )
        .arg(
            Arg::new("threshold")
                .long("threshold")
                .help("Foreground intensity threshold for region detection")
                .value_name("N")
                .default_value("10")
                .required(false),
        )
        .arg(
            Arg::new("info")
                .short('i')
                .long("info")
                .help("Print the pyramid structure instead of extracting")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let logger = match Logger::new("slidecrop.log") {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Error initializing logger: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = Logger::init_global_logger("slidecrop-global.log") {
        eprintln!("Error setting up global logger: {}", e);
        process::exit(1);
    }

    let factory = SlidecropCommandFactory::new();

    match factory.create_command(&matches, &logger) {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
}
