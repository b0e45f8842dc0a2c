use anyhow::{Context, Result};
use std::fmt::Display;
use std::io::{BufRead, Write};
use std::str::FromStr;

use super::state::{Step, Wizard};
use crate::profile::{Profile, Scenario, UtilizationRange, PROGRAM_TIMELINES};

/// Where wizard prompts are written. A JSON report keeps stdout to itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTarget {
    Stdout,
    Stderr,
}

impl PromptTarget {
    pub fn for_report(json: bool) -> Self {
        if json {
            PromptTarget::Stderr
        } else {
            PromptTarget::Stdout
        }
    }

    pub fn writer(self) -> Box<dyn Write> {
        match self {
            PromptTarget::Stdout => Box::new(std::io::stdout()),
            PromptTarget::Stderr => Box::new(std::io::stderr()),
        }
    }
}

/// Line-based prompts over any reader/writer pair (stdin/stdout in practice).
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{}", text).context("Failed to write to output")
    }

    /// Prompt with a message and return the trimmed input.
    fn prompt(&mut self, message: &str) -> Result<String> {
        write!(self.output, "{}", message).context("Failed to write prompt")?;
        self.output.flush().context("Failed to flush output")?;
        let mut line = String::new();
        let n = self
            .input
            .read_line(&mut line)
            .context("Failed to read input")?;
        if n == 0 {
            anyhow::bail!("Input closed before the wizard was finished");
        }
        Ok(line.trim().to_string())
    }

    /// Prompt for a value, re-asking until it parses. Empty input takes the default.
    pub fn ask<T>(&mut self, message: &str, default: Option<T>) -> Result<T>
    where
        T: FromStr + Display + Copy,
    {
        loop {
            let input = match default {
                Some(d) => self.prompt(&format!("{} [{}]: ", message, d))?,
                None => self.prompt(&format!("{}: ", message))?,
            };
            if input.is_empty() {
                if let Some(d) = default {
                    return Ok(d);
                }
                self.say("  A value is required. Try again.")?;
                continue;
            }
            match clean_number(&input).parse::<T>() {
                Ok(v) => return Ok(v),
                Err(_) => self.say(&format!("  '{}' is not a valid number. Try again.", input))?,
            }
        }
    }

    /// Yes/no question. Empty input takes the default.
    pub fn ask_yes_no(&mut self, message: &str, default_yes: bool) -> Result<bool> {
        let hint = if default_yes { "Y/n" } else { "y/N" };
        loop {
            let input = self.prompt(&format!("{} [{}]: ", message, hint))?.to_lowercase();
            match input.as_str() {
                "" => return Ok(default_yes),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.say("  Please answer y or n.")?,
            }
        }
    }

    /// Numbered menu. Returns the 0-based index of the chosen option.
    pub fn choose(&mut self, message: &str, options: &[&str], default: usize) -> Result<usize> {
        self.say(message)?;
        for (i, option) in options.iter().enumerate() {
            self.say(&format!("  {}) {}", i + 1, option))?;
        }
        loop {
            let picked: usize = self.ask("Choice", Some(default + 1))?;
            if (1..=options.len()).contains(&picked) {
                return Ok(picked - 1);
            }
            self.say(&format!("  Pick a number between 1 and {}.", options.len()))?;
        }
    }
}

/// Accept "$20,000" style amounts.
fn clean_number(input: &str) -> String {
    input
        .chars()
        .filter(|c| *c != '$' && *c != ',' && *c != '_')
        .collect()
}

fn fill_step<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    wizard: &mut Wizard,
) -> Result<()> {
    let step = wizard.step();
    let d = &mut wizard.draft;
    match step {
        Step::Scenario => {
            let current = match d.scenario {
                Some(Scenario::ExistingClient) => 1,
                _ => 0,
            };
            let picked = prompter.choose(
                "Which describes you?",
                &["New client (not enrolled yet)", "Existing client (already enrolled)"],
                current,
            )?;
            let scenario = if picked == 1 {
                Scenario::ExistingClient
            } else {
                Scenario::NewClient
            };
            d.scenario = Some(scenario);
            d.fico_score = Some(prompter.ask("Current credit score (300-850)", d.fico_score)?);
            d.months_in_program = match scenario {
                Scenario::ExistingClient => Some(
                    prompter.ask("Months already in the program", d.months_in_program)?,
                ),
                Scenario::NewClient => None,
            };
        }
        Step::Finances => {
            d.total_debt = Some(prompter.ask("Total enrolled debt ($)", d.total_debt)?);
            d.monthly_income = Some(prompter.ask("Monthly income ($)", d.monthly_income)?);
            d.total_credit_limit = Some(prompter.ask(
                "Total credit limit across cards ($, 0 if unknown)",
                d.total_credit_limit.or(Some(0.0)),
            )?);
            let labels: Vec<&str> = UtilizationRange::ALL.iter().map(|r| r.label()).collect();
            let current = d
                .utilization_bucket
                .and_then(UtilizationRange::from_bucket)
                .and_then(|r| UtilizationRange::ALL.iter().position(|x| *x == r))
                .unwrap_or(2);
            let picked = prompter.choose("Current credit utilization", &labels, current)?;
            d.utilization_bucket = UtilizationRange::ALL.get(picked).map(|r| r.bucket());
        }
        Step::History => {
            d.accounts_enrolling =
                Some(prompter.ask("Accounts enrolling in the program", d.accounts_enrolling)?);
            d.positive_accounts = Some(prompter.ask(
                "Accounts in good standing you will keep open",
                d.positive_accounts.or(Some(0)),
            )?);
            d.oldest_account_age_years = Some(
                prompter.ask("Age of your oldest account (years)", d.oldest_account_age_years)?,
            );
        }
        Step::Program => {
            let labels: Vec<String> = PROGRAM_TIMELINES
                .iter()
                .map(|m| format!("{} months", m))
                .collect();
            let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();
            let current = d
                .program_timeline_months
                .and_then(|m| PROGRAM_TIMELINES.iter().position(|x| *x == m))
                .unwrap_or(2);
            let picked = prompter.choose("Program length", &label_refs, current)?;
            d.program_timeline_months = PROGRAM_TIMELINES.get(picked).copied();

            d.tools.secured_card =
                prompter.ask_yes_no("Will you open a secured card?", d.tools.secured_card)?;
            d.tools.credit_builder =
                prompter.ask_yes_no("Will you use a credit builder loan?", d.tools.credit_builder)?;
            d.tools.authorized_user = prompter.ask_yes_no(
                "Will you be added as an authorized user?",
                d.tools.authorized_user,
            )?;
        }
    }
    Ok(())
}

/// Walk the user through all four steps and return a validated profile.
pub fn run_wizard<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    mut wizard: Wizard,
) -> Result<Profile> {
    loop {
        let step = wizard.step();
        prompter.say("")?;
        prompter.say(&format!(
            "Step {} of {}: {}",
            step.number(),
            Step::ALL.len(),
            step.title()
        ))?;
        fill_step(prompter, &mut wizard)?;

        if !wizard.is_last_step() {
            if !wizard.advance() {
                report_errors(prompter, wizard.errors())?;
            }
            continue;
        }

        if !prompter.ask_yes_no("Run the projection with these answers?", true)? {
            wizard.back();
            continue;
        }

        match wizard.finish() {
            Ok(profile) => return Ok(profile),
            Err(errors) => report_errors(prompter, &errors)?,
        }
    }
}

fn report_errors<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    errors: &[String],
) -> Result<()> {
    prompter.say("Please fix the following:")?;
    for error in errors {
        prompter.say(&format!("  - {}", error))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::types::sample_profile;
    use crate::wizard::ProfileDraft;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_json_report_moves_prompts_to_stderr() {
        assert_eq!(PromptTarget::for_report(true), PromptTarget::Stderr);
        assert_eq!(PromptTarget::for_report(false), PromptTarget::Stdout);
    }

    #[test]
    fn test_clean_number() {
        assert_eq!(clean_number("$20,000"), "20000");
        assert_eq!(clean_number("1_500.50"), "1500.50");
    }

    #[test]
    fn test_ask_reprompts_on_garbage() {
        let mut p = prompter("abc\n\n42\n");
        let value: u32 = p.ask("Score", None).unwrap();
        assert_eq!(value, 42);
        let output = String::from_utf8(p.into_output()).unwrap();
        assert!(output.contains("'abc' is not a valid number"));
        assert!(output.contains("A value is required"));
    }

    #[test]
    fn test_ask_uses_default() {
        let mut p = prompter("\n");
        let value: f64 = p.ask("Income", Some(3500.0)).unwrap();
        assert_eq!(value, 3500.0);
    }

    #[test]
    fn test_choose_out_of_range() {
        let mut p = prompter("7\n2\n");
        let picked = p.choose("Pick", &["a", "b", "c"], 0).unwrap();
        assert_eq!(picked, 1);
    }

    #[test]
    fn test_closed_input_is_error() {
        let mut p = prompter("");
        assert!(p.ask::<u32>("Score", None).is_err());
    }

    #[test]
    fn test_full_wizard_run() {
        let input = [
            "1",       // new client
            "900",     // invalid score, step is re-asked
            "1",       // new client again
            "650",     // score
            "$20,000", // debt
            "4000",    // income
            "25000",   // credit limit
            "3",       // 50% - 70%
            "3",       // accounts enrolling
            "1",       // positive accounts
            "5",       // oldest account
            "3",       // 36 months
            "n",       // secured card
            "n",       // credit builder
            "n",       // authorized user
            "y",       // run it
        ]
        .join("\n")
            + "\n";

        let mut p = prompter(&input);
        let profile = run_wizard(&mut p, Wizard::new()).unwrap();
        assert_eq!(profile, sample_profile());

        let output = String::from_utf8(p.into_output()).unwrap();
        assert!(output.contains("Step 1 of 4: Your situation"));
        assert!(output.contains("fico_score: must be between 300 and 850"));
        assert!(output.contains("Step 4 of 4: Program and tools"));
    }

    #[test]
    fn test_wizard_prefilled_accepts_defaults() {
        // Every prompt answered with Enter keeps the prefilled value
        let input = "\n".repeat(14);
        let mut p = prompter(&input);
        let wizard = Wizard::with_draft(ProfileDraft::from(&sample_profile()));
        let profile = run_wizard(&mut p, wizard).unwrap();
        assert_eq!(profile, sample_profile());
    }

    #[test]
    fn test_declining_goes_back_a_step() {
        let mut input = "\n".repeat(13);
        input.push_str("n\n"); // decline, back to step 3
        input.push_str(&"\n".repeat(3)); // step 3 again
        input.push_str(&"\n".repeat(4)); // step 4 again
        input.push_str("y\n");

        let mut p = prompter(&input);
        let wizard = Wizard::with_draft(ProfileDraft::from(&sample_profile()));
        let profile = run_wizard(&mut p, wizard).unwrap();
        assert_eq!(profile, sample_profile());

        let output = String::from_utf8(p.into_output()).unwrap();
        assert_eq!(output.matches("Step 3 of 4").count(), 2);
    }
}
