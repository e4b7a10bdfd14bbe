// src/cli/evaluate_args.rs
use crate::core::evaluation::EvaluationRequest;
use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// Arguments for the `evaluate` command.
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Path to the audio recording (PCM WAV preferred)
    pub audio: PathBuf,

    /// Topic the speech was supposed to address
    #[arg(long)]
    pub topic: Option<String>,

    /// Speech category, e.g. "Prepared Speech" or "Table Topics"
    #[arg(long = "speech-type")]
    pub speech_type: Option<String>,

    /// Expected duration, e.g. "5-7 minutes"
    #[arg(long = "expected-duration")]
    pub expected_duration: Option<String>,

    /// Reported actual duration as MM:SS; probed from the audio if absent
    #[arg(long = "actual-duration")]
    pub actual_duration: Option<String>,

    /// Speaker gender for the pitch band: male, female, or auto
    #[arg(long, value_parser = ["male", "female", "auto"])]
    pub gender: Option<String>,

    /// Domain scoring profile
    #[arg(long, default_value = "general")]
    pub domain: String,

    /// Output format for the report
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

/// Report rendering selection.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable colored report
    Text,
    /// The JSON response envelope
    Json,
}

impl EvaluateArgs {
    /// Convert the parsed arguments into an evaluation request.
    pub fn to_request(&self) -> EvaluationRequest {
        EvaluationRequest {
            audio_path: self.audio.clone(),
            topic: self.topic.clone(),
            speech_type: self.speech_type.clone(),
            expected_duration: self.expected_duration.clone(),
            actual_duration: self.actual_duration.clone(),
            gender_hint: self.gender.clone(),
            domain: self.domain.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: EvaluateArgs,
    }

    #[test]
    fn test_defaults() {
        let wrapper = Wrapper::try_parse_from(["test", "talk.wav"]).unwrap();
        assert_eq!(wrapper.args.domain, "general");
        assert_eq!(wrapper.args.output, OutputFormat::Text);
        assert!(wrapper.args.gender.is_none());
    }

    #[test]
    fn test_gender_values_validated() {
        assert!(Wrapper::try_parse_from(["test", "talk.wav", "--gender", "female"]).is_ok());
        assert!(Wrapper::try_parse_from(["test", "talk.wav", "--gender", "robot"]).is_err());
    }

    #[test]
    fn test_to_request_carries_fields() {
        let wrapper = Wrapper::try_parse_from([
            "test",
            "talk.wav",
            "--topic",
            "Courage",
            "--actual-duration",
            "06:00",
            "--domain",
            "academic",
        ])
        .unwrap();
        let request = wrapper.args.to_request();
        assert_eq!(request.topic.as_deref(), Some("Courage"));
        assert_eq!(request.actual_duration.as_deref(), Some("06:00"));
        assert_eq!(request.domain, "academic");
    }
}
