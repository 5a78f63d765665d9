//! Builder for engine command lines.
//!
//! Every convenience setter maps one key to one flag. Input options precede
//! their `-i`, output options precede their target, and global options come
//! first.

use std::path::PathBuf;

use crate::duration::format_timestamp;
use crate::engine::EngineError;

/// Where an input is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    /// Any URL or device spec the engine understands.
    Url(String),
    /// The payload written to the engine's stdin.
    Stdin,
}

impl Source {
    fn render(&self) -> String {
        match self {
            Self::Path(path) => path.to_string_lossy().to_string(),
            Self::Url(url) => url.clone(),
            Self::Stdin => "pipe:0".to_string(),
        }
    }
}

/// Where an output is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Path(PathBuf),
    /// The payload read from the engine's stdout.
    Stdout,
}

impl Target {
    fn render(&self) -> String {
        match self {
            Self::Path(path) => path.to_string_lossy().to_string(),
            Self::Stdout => "pipe:1".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct InputSpec {
    source: Source,
    options: Vec<String>,
}

#[derive(Debug, Clone)]
struct OutputSpec {
    target: Target,
    options: Vec<String>,
}

/// An engine invocation, compiled to a flat argument list by [`Self::args`].
///
/// Input options apply to the most recently added input, output options to
/// the most recently added output. Options given before any input or output
/// exists are held for the next one added.
#[derive(Debug, Clone, Default)]
pub struct EngineCommand {
    global: Vec<String>,
    inputs: Vec<InputSpec>,
    outputs: Vec<OutputSpec>,
    pending_input: Vec<String>,
    pending_output: Vec<String>,
}

impl EngineCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, source: Source) -> Self {
        let options = std::mem::take(&mut self.pending_input);
        self.inputs.push(InputSpec { source, options });
        self
    }

    pub fn output(mut self, target: Target) -> Self {
        let options = std::mem::take(&mut self.pending_output);
        self.outputs.push(OutputSpec { target, options });
        self
    }

    pub fn global_option(mut self, arg: impl Into<String>) -> Self {
        self.global.push(arg.into());
        self
    }

    pub fn input_option(mut self, arg: impl Into<String>) -> Self {
        match self.inputs.last_mut() {
            Some(input) => input.options.push(arg.into()),
            None => self.pending_input.push(arg.into()),
        }
        self
    }

    pub fn output_option(mut self, arg: impl Into<String>) -> Self {
        match self.outputs.last_mut() {
            Some(output) => output.options.push(arg.into()),
            None => self.pending_output.push(arg.into()),
        }
        self
    }

    fn input_flag(self, flag: &str, value: impl Into<String>) -> Self {
        self.input_option(flag).input_option(value)
    }

    fn output_flag(self, flag: &str, value: impl Into<String>) -> Self {
        self.output_option(flag).output_option(value)
    }

    /// `-y`
    pub fn overwrite(self) -> Self {
        self.global_option("-y")
    }

    /// `-ss` before the current input (fast, keyframe based seek).
    pub fn seek_input(self, position_ms: u64) -> Self {
        self.input_flag("-ss", format_timestamp(position_ms))
    }

    /// `-f` before the current input.
    pub fn input_format(self, format: impl Into<String>) -> Self {
        self.input_flag("-f", format)
    }

    /// `-ss` on the current output.
    pub fn seek(self, position_ms: u64) -> Self {
        self.output_flag("-ss", format_timestamp(position_ms))
    }

    /// `-t`
    pub fn duration(self, duration_ms: u64) -> Self {
        self.output_flag("-t", format_timestamp(duration_ms))
    }

    /// `-f`
    pub fn format(self, format: impl Into<String>) -> Self {
        self.output_flag("-f", format)
    }

    /// `-c:v`
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_flag("-c:v", codec)
    }

    /// `-c:a`
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_flag("-c:a", codec)
    }

    /// `-b:v` in kbit/s.
    pub fn video_bitrate(self, kbps: u32) -> Self {
        self.output_flag("-b:v", format!("{}k", kbps))
    }

    /// `-b:a` in kbit/s.
    pub fn audio_bitrate(self, kbps: u32) -> Self {
        self.output_flag("-b:a", format!("{}k", kbps))
    }

    /// `-s WxH`
    pub fn size(self, width: u32, height: u32) -> Self {
        self.output_flag("-s", format!("{}x{}", width, height))
    }

    /// `-r`
    pub fn fps(self, fps: f64) -> Self {
        self.output_flag("-r", fps.to_string())
    }

    /// `-ac`
    pub fn audio_channels(self, channels: u32) -> Self {
        self.output_flag("-ac", channels.to_string())
    }

    /// `-ar`
    pub fn audio_frequency(self, hz: u32) -> Self {
        self.output_flag("-ar", hz.to_string())
    }

    /// `-an`
    pub fn no_audio(self) -> Self {
        self.output_option("-an")
    }

    /// `-vn`
    pub fn no_video(self) -> Self {
        self.output_option("-vn")
    }

    /// `-vf`
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_flag("-vf", filter)
    }

    /// `-af`
    pub fn audio_filter(self, filter: impl Into<String>) -> Self {
        self.output_flag("-af", filter)
    }

    /// Whether an input reads the stdin payload.
    pub fn reads_stdin(&self) -> bool {
        self.inputs.iter().any(|i| i.source == Source::Stdin)
    }

    /// Whether an output writes the stdout payload.
    pub fn writes_stdout(&self) -> bool {
        self.outputs.iter().any(|o| o.target == Target::Stdout)
    }

    /// Compiles the flat argument list.
    pub fn args(&self) -> Result<Vec<String>, EngineError> {
        // Pending options only exist while no input or output has been added
        if self.inputs.is_empty() {
            return Err(EngineError::invalid_command(
                if self.pending_input.is_empty() {
                    "no input given"
                } else {
                    "input options given without a following input"
                },
            ));
        }
        if self.outputs.is_empty() {
            return Err(EngineError::invalid_command(
                if self.pending_output.is_empty() {
                    "no output given"
                } else {
                    "output options given without a following output"
                },
            ));
        }
        let stdin_inputs = self
            .inputs
            .iter()
            .filter(|i| i.source == Source::Stdin)
            .count();
        if stdin_inputs > 1 {
            return Err(EngineError::invalid_command("stdin can feed only one input"));
        }
        let stdout_outputs = self
            .outputs
            .iter()
            .filter(|o| o.target == Target::Stdout)
            .count();
        if stdout_outputs > 1 {
            return Err(EngineError::invalid_command(
                "stdout can carry only one output",
            ));
        }

        let mut args = self.global.clone();
        for input in &self.inputs {
            args.extend(input.options.iter().cloned());
            args.push("-i".to_string());
            args.push(input.source.render());
        }
        for output in &self.outputs {
            args.extend(output.options.iter().cloned());
            args.push(output.target.render());
        }
        Ok(args)
    }
}
