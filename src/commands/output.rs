//! Output command handlers: everything that reaches the HID sink.

use std::sync::Arc;

use anyhow::Context as _;
use keyrelay::hid::{PrinterConfig, PrinterSink, RecordingSink};
use keyrelay::{spawn_executor, ChainRunner, ControlError, Request, RunError};

use super::{setup_interrupt_handler, CommandResult, Context};

/// Type text verbatim
pub async fn type_text(ctx: &Context, text: &str) -> CommandResult {
    submit(ctx, Request::TypeText(text.to_string())).await
}

/// Interpret and execute one command line
pub async fn execute(ctx: &Context, line: &str) -> CommandResult {
    submit(ctx, Request::Execute(line.to_string())).await
}

/// Run a stored chain
pub async fn run(ctx: &Context, name: &str) -> CommandResult {
    submit(ctx, Request::RunChain(name.to_string())).await
}

async fn submit(ctx: &Context, request: Request) -> CommandResult {
    let printer = PrinterConfig::default()
        .with_timestamps(ctx.timestamps)
        .with_probes(ctx.probes);
    let sink = PrinterSink::wrap(Arc::new(RecordingSink::new()), printer);
    let runner = ChainRunner::new(ctx.config.interpreter(), sink, ctx.config.runner_options());
    let (handle, executor) =
        spawn_executor(runner, ctx.store.clone(), ctx.config.control_options());
    setup_interrupt_handler(handle.cancel_token());

    let outcome = handle.execute(request).await;
    drop(handle);
    executor.await.context("executor task failed")?;

    match outcome {
        Ok(done) => {
            println!(
                "{}: {} line(s), {} action(s)",
                done.label, done.lines, done.actions
            );
            Ok(())
        }
        Err(ControlError::Run(RunError::Cancelled { completed_lines })) => {
            println!("Interrupted after {completed_lines} line(s)");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
