//! Release lifecycle commands: version, status, cut, advance, release
//!
//! Each command resolves an orchestrator from the repository context and
//! prints either an emoji summary or a JSON document.

use crate::core::context::RepoContext;
use crate::core::error::ReleaseResult;
use crate::core::plan::OperationType;
use crate::release::{NextStep, ReleaseReport};
use crate::version::LifecycleState;

/// Print the current version (for CI to derive the per-build version)
pub fn run_version(ctx: &RepoContext) -> ReleaseResult<()> {
  let version = ctx.version_file().read()?;
  println!("{}", version);
  Ok(())
}

/// Show version, lifecycle state and release tag
pub fn run_status(ctx: &RepoContext, json: bool) -> ReleaseResult<()> {
  let status = ctx.orchestrator()?.status()?;

  if json {
    println!("{}", serde_json::to_string_pretty(&status)?);
    return Ok(());
  }

  println!("📦 Version {}", status.version);
  println!();
  match status.state {
    LifecycleState::Snapshot => println!("  State:    🚧 snapshot"),
    LifecycleState::Released => println!("  State:    🏷️  released"),
  }
  match &status.tag_commit {
    Some(commit) => println!("  Tag:      {} → {}", status.tag, commit.short()),
    None => println!("  Tag:      {} (not created)", status.tag),
  }
  println!();

  match (status.next_step, status.tag_commit.is_some()) {
    (NextStep::CutRelease, _) => println!("Next: release-rail release"),
    (NextStep::AdvanceSnapshot, true) => {
      println!("⚠️  Release {} was cut but not advanced", status.version);
      println!("Next: release-rail advance --push");
    }
    (NextStep::AdvanceSnapshot, false) => println!("Next: release-rail advance"),
  }

  Ok(())
}

/// Snapshot → Released (no push)
pub fn run_cut(ctx: &RepoContext, dry_run: bool, json: bool) -> ReleaseResult<()> {
  let orchestrator = ctx.orchestrator()?;

  if dry_run {
    let plan = orchestrator.plan(OperationType::CutRelease, false)?;
    if json {
      println!("{}", plan.to_json()?);
    } else {
      println!("{}", plan.to_human_readable());
      println!("🔍 Dry-run mode (no changes applied)");
    }
    return Ok(());
  }

  let report = orchestrator.cut_release()?;
  print_report(&report, json)?;

  if !json {
    println!();
    println!("Next steps:");
    println!("  release-rail advance --push");
  }
  Ok(())
}

/// Released → next Snapshot, optionally pushing branch and release tag
///
/// This is also the resume point after a `PartialRelease`.
pub fn run_advance(ctx: &RepoContext, push: bool, json: bool) -> ReleaseResult<()> {
  let orchestrator = ctx.orchestrator()?;
  let mut report = orchestrator.advance_snapshot()?;

  if push && let Some(released) = &report.released {
    orchestrator.push_release(released)?;
    report.pushed = true;
  }

  print_report(&report, json)
}

/// Full run: cut, advance and (unless `no_push`) push
pub fn run_release(ctx: &RepoContext, dry_run: bool, no_push: bool, json: bool) -> ReleaseResult<()> {
  let orchestrator = ctx.orchestrator()?;

  if dry_run {
    let plan = orchestrator.plan(OperationType::Release, !no_push)?;
    if json {
      println!("{}", plan.to_json()?);
    } else {
      println!("{}", plan.to_human_readable());
      println!("🔍 Dry-run mode (no changes applied)");
    }
    return Ok(());
  }

  let report = orchestrator.release(!no_push)?;
  print_report(&report, json)?;

  if !json
    && !report.pushed
    && let Some(tag) = &report.tag
  {
    println!();
    println!("Next steps:");
    println!("  git push --atomic {} HEAD {}", ctx.config.git.remote, tag);
  }
  Ok(())
}

fn print_report(report: &ReleaseReport, json: bool) -> ReleaseResult<()> {
  if json {
    println!("{}", serde_json::to_string_pretty(report)?);
    return Ok(());
  }

  match report.operation {
    OperationType::CutRelease => println!("✅ Released {}", report.to),
    OperationType::AdvanceSnapshot => println!("✅ Switched to {}", report.to),
    OperationType::Release => match &report.released {
      Some(released) => println!("✅ Release {} completed, now on {}", released, report.to),
      None => println!("✅ Now on {}", report.to),
    },
  }

  for commit in &report.commits {
    println!("   Commit: {}", commit.short());
  }
  if let Some(tag) = &report.tag {
    println!("   Tag:    {}", tag);
  }
  if report.pushed {
    println!("   Pushed: yes");
  }

  Ok(())
}
