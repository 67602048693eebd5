//! The sample form, as a sequence of terminal prompts.

use std::str::FromStr;

use dialoguer::{Confirm, Input, Select};
use waterborne_input_models::{
    CanonicalInput, Community, InputRecord, MAX_PH, MAX_YEAR, MIN_YEAR, Region, Season,
};
use waterborne_predict::PredictionContext;

use crate::{ModeArg, run_mode};

/// Prompts for a sample, predicts, and repeats until the user stops.
///
/// # Errors
///
/// Returns an error if a prompt fails or a prediction cannot be made.
pub fn run(context: &PredictionContext) -> Result<(), Box<dyn std::error::Error>> {
    println!("Waterborne Disease Prediction");
    println!();

    loop {
        let record = prompt_record()?;
        let input = match CanonicalInput::try_from(record) {
            Ok(input) => input,
            Err(e) => {
                log::warn!("Rejected sample: {e}");
                println!("Invalid sample: {e}");
                println!();
                continue;
            }
        };

        let labels: Vec<&str> = ModeArg::ALL.iter().map(|m| m.label()).collect();
        let idx = Select::new()
            .with_prompt("Predict")
            .items(&labels)
            .default(0)
            .interact()?;

        println!();
        match run_mode(context, ModeArg::ALL[idx], &input, false) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                log::error!("Prediction failed: {e}");
                println!("Prediction failed: {e}");
            }
        }
        println!();

        let again = Confirm::new()
            .with_prompt("Make another prediction?")
            .default(true)
            .interact()?;
        if !again {
            return Ok(());
        }
    }
}

fn prompt_record() -> dialoguer::Result<InputRecord> {
    let region = choose("Region", Region::all())?;
    let community = choose("Community", Community::all())?;
    let season = choose("Season", Season::all())?;

    Ok(InputRecord {
        region,
        community,
        season,
        turbidity: number("Turbidity (NTU)", 1.0, non_negative, "must be a number >= 0")?,
        ecoli_count: number(
            "E. coli Count (CFU/100ml)",
            0_i64,
            |v: &i64| *v >= 0,
            "must be >= 0",
        )?,
        nitrate: number("Nitrate (mg/L)", 1.0, non_negative, "must be a number >= 0")?,
        ph: number(
            "pH",
            7.0,
            |v: &f64| (0.0..=MAX_PH).contains(v),
            "must be between 0 and 14",
        )?,
        year: number(
            "Year",
            2023,
            |v: &i32| (MIN_YEAR..=MAX_YEAR).contains(v),
            "must be between 2000 and 2100",
        )?,
        month: number(
            "Month",
            1,
            |v: &i32| (1..=12).contains(v),
            "must be between 1 and 12",
        )?,
    })
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn non_negative(value: &f64) -> bool {
    value.is_finite() && *value >= 0.0
}

fn choose<T: AsRef<str>>(prompt: &str, options: &[T]) -> dialoguer::Result<String> {
    let labels: Vec<&str> = options.iter().map(|v| v.as_ref()).collect();
    let idx = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(labels[idx].to_string())
}

fn number<T>(
    prompt: &str,
    default: T,
    valid: impl Fn(&T) -> bool + 'static,
    hint: &'static str,
) -> dialoguer::Result<T>
where
    T: Clone + ToString + FromStr + 'static,
    <T as FromStr>::Err: ToString + std::fmt::Debug,
{
    Input::<T>::new()
        .with_prompt(prompt)
        .default(default)
        .validate_with(move |value: &T| if valid(value) { Ok(()) } else { Err(hint) })
        .interact_text()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measurements_must_be_finite_and_non_negative() {
        assert!(non_negative(&0.0));
        assert!(non_negative(&12.5));
        assert!(!non_negative(&-0.1));
        assert!(!non_negative(&f64::INFINITY));
        assert!(!non_negative(&f64::NAN));
        assert!("inf".parse::<f64>().is_ok_and(|v| !non_negative(&v)));
    }
}
