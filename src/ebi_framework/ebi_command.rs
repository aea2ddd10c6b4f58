use anyhow::{Context, Result, anyhow};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use std::path::PathBuf;

use crate::{
    ebi_commands::ebi_command_align,
    ebi_framework::ebi_output::{self, EbiExporter, EbiOutput, EbiOutputType},
};

pub const EBI_COMMANDS: EbiCommand = EbiCommand::Group {
    name_short: "ebi_align",
    name_long: None,
    explanation_short: "Optimal alignments of traces and Petri nets.",
    explanation_long: None,
    children: &[&ebi_command_align::EBI_ALIGN],
};

pub const ARG_SHORT_OUTPUT: char = 'o';
pub const ARG_ID_OUTPUT: &str = "output";
pub const ARG_ID_JSON: &str = "json";

pub enum EbiCommand {
    Group {
        name_short: &'static str,
        name_long: Option<&'static str>,
        explanation_short: &'static str,
        explanation_long: Option<&'static str>,
        children: &'static [&'static EbiCommand],
    },
    Command {
        name_short: &'static str,
        name_long: Option<&'static str>,
        explanation_short: &'static str,
        explanation_long: Option<&'static str>,
        cli_command: Option<fn(command: Command) -> Command>, //create the cli command. An output -o argument is always added

        input_names: &'static [&'static str], //fixed-position file parameters
        input_helps: &'static [&'static str],

        execute: fn(inputs: Vec<PathBuf>, cli_matches: &ArgMatches) -> Result<EbiOutput>,
        output_type: &'static EbiOutputType,
    },
}

impl EbiCommand {
    pub fn build_cli(&self) -> Command {
        let mut command;
        match self {
            EbiCommand::Group {
                name_short,
                name_long,
                explanation_short,
                explanation_long,
                children,
            } => {
                let name = if let Some(x) = name_long { x } else { name_short };
                command = Command::new(*name)
                    .about(*explanation_short)
                    .subcommand_required(true)
                    .allow_external_subcommands(false);

                if name_long.is_some() {
                    command = command.alias(*name_short);
                }

                if let Some(l) = explanation_long {
                    command = command.long_about(*l);
                }

                for child in children.iter() {
                    let subcommand = child.build_cli();
                    command = command.subcommand(subcommand);
                }
            }
            EbiCommand::Command {
                name_short,
                name_long,
                explanation_short,
                explanation_long,
                cli_command,
                input_names,
                input_helps,
                ..
            } => {
                let name = if let Some(x) = name_long { x } else { name_short };
                command = Command::new(*name).about(*explanation_short);

                if name_long.is_some() {
                    command = command.alias(*name_short);
                }

                if let Some(l) = explanation_long {
                    command = command.long_about(*l);
                }

                for (i, (input_name, input_help)) in
                    input_names.iter().zip(input_helps.iter()).enumerate()
                {
                    let arg = Arg::new(format!("{}x{}", input_name, i))
                        .action(ArgAction::Set)
                        .value_name(*input_name)
                        .help(*input_help)
                        .required(true)
                        .value_parser(value_parser!(PathBuf));

                    command = command.arg(arg);
                }

                if let Some(f) = cli_command {
                    command = (f)(command);
                }

                command = command
                    .arg(
                        Arg::new(ARG_ID_OUTPUT)
                            .short(ARG_SHORT_OUTPUT)
                            .long(ARG_ID_OUTPUT)
                            .action(ArgAction::Set)
                            .value_name("FILE")
                            .help("Saves the result to a file.")
                            .required(false)
                            .value_parser(value_parser!(PathBuf)),
                    )
                    .arg(
                        Arg::new(ARG_ID_JSON)
                            .long(ARG_ID_JSON)
                            .action(ArgAction::SetTrue)
                            .help("Writes the result as JSON instead of text.")
                            .required(false),
                    );
            }
        };
        command
    }

    pub fn long_name(&self) -> &str {
        match self {
            EbiCommand::Group {
                name_short,
                name_long,
                ..
            } => name_long.unwrap_or(*name_short),
            EbiCommand::Command {
                name_short,
                name_long,
                ..
            } => name_long.unwrap_or(*name_short),
        }
    }

    pub fn execute(&self, cli_matches: &ArgMatches) -> Result<()> {
        match self {
            EbiCommand::Group { children, .. } => {
                for child in children.iter() {
                    if let Some(sub_matches) = cli_matches.subcommand_matches(child.long_name()) {
                        return child.execute(sub_matches);
                    }
                }
            }
            EbiCommand::Command {
                execute,
                output_type,
                input_names,
                ..
            } => {
                //gather the inputs
                let mut inputs = vec![];
                for (i, input_name) in input_names.iter().enumerate() {
                    let cli_id = format!("{}x{}", input_name, i);
                    let input = cli_matches
                        .get_one::<PathBuf>(&cli_id)
                        .with_context(|| format!("reading parameter {}", input_name))?;
                    inputs.push(input.clone());
                }

                log::info!("Starting {}", self.long_name());

                let result = (execute)(inputs, cli_matches)?;

                if &&result.get_type() != output_type {
                    return Err(anyhow!(
                        "output type {} does not match the declared output of {}",
                        result.get_type(),
                        output_type
                    ));
                }

                let exporter = if cli_matches.get_flag(ARG_ID_JSON) {
                    EbiExporter::Json
                } else {
                    EbiExporter::Text
                };

                if let Some(to_file) = cli_matches.get_one::<PathBuf>(ARG_ID_OUTPUT) {
                    //write result to file
                    log::info!("Writing result to {:?} as {}", to_file, exporter);
                    ebi_output::export_object(to_file, result, exporter)?;
                } else {
                    //write result to STDOUT
                    log::info!("Writing result as {}", exporter);
                    print!("{}", ebi_output::export_to_string(result, exporter)?);
                }

                return Ok(());
            }
        }
        Err(anyhow!("command not recognised"))
    }
}
