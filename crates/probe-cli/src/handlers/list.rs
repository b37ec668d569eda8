//! List command handler

use crate::commands::ListArgs;
use crate::error::CliResult;
use booker_probe::runner::select;
use booker_probe::{catalogue, GroupMode, RunOptions, Scenario};

/// Execute the list command
pub fn execute_list(args: &ListArgs) -> CliResult<()> {
    let mut options = RunOptions::default();
    options.suite = args.suite.suite();
    for tag in &args.tags {
        options = options.with_tag(tag.clone());
    }
    print!("{}", render_list(&select(catalogue(), &options)));
    Ok(())
}

/// One line per scenario: suite, group, name and tags.
#[must_use]
pub fn render_list(scenarios: &[Scenario]) -> String {
    let group_width = scenarios.iter().map(|s| s.group.len()).max().unwrap_or(0);
    let mut output = String::new();
    for scenario in scenarios {
        let mode = match scenario.mode {
            GroupMode::Serial => "",
            GroupMode::Parallel => " (parallel)",
        };
        let tags: Vec<String> = scenario.tags.iter().map(|t| format!("@{t}")).collect();
        output.push_str(&format!(
            "{:<3} {:<group_width$} {}{} [{}]\n",
            scenario.suite.as_str(),
            scenario.group,
            scenario.name,
            mode,
            tags.join(" "),
        ));
    }
    output.push_str(&format!("{} scenario(s)\n", scenarios.len()));
    output
}
