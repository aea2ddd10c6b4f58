use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};

use crate::{
    ebi_alignments::move_costs::{
        DEFAULT_LOG_MOVE_COST, DEFAULT_MODEL_MOVE_COST, DEFAULT_SILENT_MOVE_COST,
        DEFAULT_SYNCHRONOUS_MOVE_COST, MoveCosts, SearchLimits,
    },
    ebi_framework::{
        ebi_command::EbiCommand,
        ebi_output::{EbiOutput, EbiOutputType},
        importable::Importable,
    },
    ebi_objects::{
        accepting_petri_net::AcceptingPetriNet, alignments::Alignments,
        finite_language::FiniteLanguage,
    },
    techniques::align::Align,
};

pub const ARG_ID_ACTIVITIES: &str = "activities";
pub const ARG_ID_LOG_MOVE_COST: &str = "log-move-cost";
pub const ARG_ID_MODEL_MOVE_COST: &str = "model-move-cost";
pub const ARG_ID_SILENT_MOVE_COST: &str = "silent-move-cost";
pub const ARG_ID_SYNCHRONOUS_MOVE_COST: &str = "sync-move-cost";
pub const ARG_ID_MAX_STATES: &str = "max-states";

pub const EBI_ALIGN: EbiCommand = EbiCommand::Group {
    name_short: "ali",
    name_long: Some("align"),
    explanation_short: "Compute optimal alignments with the A* search on the marking equation.",
    explanation_long: None,
    children: &[&EBI_ALIGN_LANGUAGE, &EBI_ALIGN_TRACE],
};

pub const EBI_ALIGN_TRACE: EbiCommand = EbiCommand::Command {
    name_short: "tr",
    name_long: Some("trace"),
    explanation_short: "Compute an optimal alignment of a single trace.",
    explanation_long: Some(
        "Compute an optimal alignment of a single trace, given as a list of activities.\nThe final marking of the model must be reachable.",
    ),
    cli_command: Some(|command| {
        add_cost_arguments(command).arg(
            Arg::new(ARG_ID_ACTIVITIES)
                .action(ArgAction::Append)
                .value_name("ACTIVITY")
                .help("The activities of the trace, in order.")
                .num_args(0..)
                .required(false)
                .value_parser(value_parser!(String)),
        )
    }),
    input_names: &["MODEL"],
    input_helps: &["The accepting Petri net."],
    execute: |mut inputs, cli_matches| {
        let mut model = AcceptingPetriNet::import_from_path(&inputs.remove(0))?;
        let (costs, limits) = get_costs_and_limits(cli_matches)?;

        let trace = cli_matches
            .get_many::<String>(ARG_ID_ACTIVITIES)
            .map(|activities| activities.cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        log::info!("Aligning trace of {} events", trace.len());

        let alignment = model
            .align_trace_labels(&trace, &costs, &limits)
            .context("aligning the trace")?;

        let mut result = Alignments::new(model.get_activity_key().clone());
        result.push(Ok(alignment));
        Ok(EbiOutput::Alignments(result))
    },
    output_type: &EbiOutputType::Alignments,
};

pub const EBI_ALIGN_LANGUAGE: EbiCommand = EbiCommand::Command {
    name_short: "lang",
    name_long: Some("language"),
    explanation_short: "Compute an optimal alignment for each trace of a finite language.",
    explanation_long: Some(
        "Compute an optimal alignment for each trace of a finite language.\nThe traces are aligned one after the other; a trace that cannot be aligned is reported as an error in the output, without affecting the other traces.",
    ),
    cli_command: Some(add_cost_arguments),
    input_names: &["MODEL", "LANGUAGE"],
    input_helps: &["The accepting Petri net.", "The finite language (log)."],
    execute: |mut inputs, cli_matches| {
        let mut model = AcceptingPetriNet::import_from_path(&inputs.remove(0))?;
        let language = FiniteLanguage::import_from_path(&inputs.remove(0))?;
        let (costs, limits) = get_costs_and_limits(cli_matches)?;

        log::info!("Aligning {} traces", language.len());
        let result = model.align_language(&language, &costs, &limits);
        if result.get_number_of_failures() > 0 {
            log::warn!(
                "{} of {} traces could not be aligned",
                result.get_number_of_failures(),
                result.len()
            );
        }

        Ok(EbiOutput::Alignments(result))
    },
    output_type: &EbiOutputType::Alignments,
};

fn add_cost_arguments(command: Command) -> Command {
    command
        .arg(cost_argument(
            ARG_ID_LOG_MOVE_COST,
            "The cost of a log move.",
            DEFAULT_LOG_MOVE_COST,
        ))
        .arg(cost_argument(
            ARG_ID_MODEL_MOVE_COST,
            "The cost of a model move on a labelled transition.",
            DEFAULT_MODEL_MOVE_COST,
        ))
        .arg(cost_argument(
            ARG_ID_SILENT_MOVE_COST,
            "The cost of a model move on a silent transition.",
            DEFAULT_SILENT_MOVE_COST,
        ))
        .arg(cost_argument(
            ARG_ID_SYNCHRONOUS_MOVE_COST,
            "The cost of a synchronous move.",
            DEFAULT_SYNCHRONOUS_MOVE_COST,
        ))
        .arg(
            Arg::new(ARG_ID_MAX_STATES)
                .long(ARG_ID_MAX_STATES)
                .action(ArgAction::Set)
                .value_name("NUMBER")
                .help("Give up on a trace after visiting this many states.")
                .required(false)
                .value_parser(value_parser!(usize)),
        )
}

fn cost_argument(id: &'static str, help: &'static str, default: f64) -> Arg {
    Arg::new(id)
        .long(id)
        .action(ArgAction::Set)
        .value_name("COST")
        .help(help)
        .required(false)
        .default_value(default.to_string())
        .value_parser(value_parser!(f64))
}

pub fn get_costs_and_limits(cli_matches: &ArgMatches) -> Result<(MoveCosts, SearchLimits)> {
    let get = |id: &str| {
        cli_matches
            .get_one::<f64>(id)
            .copied()
            .with_context(|| format!("reading parameter {}", id))
    };

    let costs = MoveCosts::standard()
        .with_log_move_cost(get(ARG_ID_LOG_MOVE_COST)?)
        .with_model_move_cost(get(ARG_ID_MODEL_MOVE_COST)?)
        .with_silent_move_cost(get(ARG_ID_SILENT_MOVE_COST)?)
        .with_synchronous_move_cost(get(ARG_ID_SYNCHRONOUS_MOVE_COST)?);
    costs.validate(0, 0)?;

    let limits = match cli_matches.get_one::<usize>(ARG_ID_MAX_STATES) {
        Some(max_visited_states) => SearchLimits::with_max_visited_states(*max_visited_states),
        None => SearchLimits::unlimited(),
    };

    Ok((costs, limits))
}
