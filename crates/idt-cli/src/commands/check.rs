use idt_engine::Classifier;
use tracing::info;

use crate::bootstrap::{RunContext, load_config, project_root};
use crate::cli::CheckArgs;
use crate::pipeline::Pipeline;
use crate::sink::{ReportSink, SinkOptions};

/// Handle `idt check`. Returns the process exit status: non-zero when any
/// translation unit could not be checked.
pub fn handle(args: &CheckArgs) -> anyhow::Result<i32> {
    let config = load_config(args)?;
    let run = RunContext::from_config(&config, &project_root(args))?;

    let classifier = Classifier::new(&run.ignore, &run.policy);
    let outcomes = Pipeline::new(&run.loader, classifier).run(&args.files);

    let sink = ReportSink::new(SinkOptions {
        format: args.format,
        apply_fixits: run.apply_fixits,
        inplace: run.inplace,
    });
    let report = sink.finish(outcomes)?;
    print!("{}", sink.render(&report)?);

    info!(
        units = report.translation_units,
        failures = report.parse_failures,
        remarks = report.remarks.len(),
        rewritten = report.rewritten_files.len(),
        "check complete"
    );
    Ok(if report.succeeded() { 0 } else { 1 })
}
