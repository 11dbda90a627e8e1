//! Interactive menu loop.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use tracing::{error, info};

use crate::config::Settings;
use crate::error::ServiceError;
use crate::input::{self, ImageSource};
use crate::render::{self, BoundingBoxRenderer};
use crate::thumbnail::{self, ThumbnailRequest};
use crate::vision::ImageAnalyzer;

pub const MENU: &str = "Please choose an option:\n1: Analyze image from file path\n2: Analyze image from URL\n0: Exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    AnalyzeFile,
    AnalyzeUrl,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::AnalyzeFile),
            "2" => Some(MenuChoice::AnalyzeUrl),
            "0" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

/// Owns the console streams and the collaborators of one interactive run.
pub struct Session<R, W, A> {
    input: R,
    output: W,
    analyzer: A,
    http: reqwest::Client,
    renderer: BoundingBoxRenderer,
    settings: Settings,
}

impl<R, W, A> Session<R, W, A>
where
    R: BufRead,
    W: Write,
    A: ImageAnalyzer,
{
    pub fn new(
        input: R,
        output: W,
        analyzer: A,
        http: reqwest::Client,
        settings: Settings,
    ) -> Self {
        let renderer = BoundingBoxRenderer::with_font_file(
            &settings.bounding_box_directory,
            settings.font_path.as_deref(),
        );
        Self {
            input,
            output,
            analyzer,
            http,
            renderer,
            settings,
        }
    }

    /// Runs until the user picks exit or the input ends.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.output, "{MENU}")?;
            let Some(line) = self.read_line()? else {
                info!("Input closed, exiting");
                return Ok(());
            };

            let source = match MenuChoice::parse(&line) {
                Some(MenuChoice::Exit) => return Ok(()),
                Some(MenuChoice::AnalyzeFile) => {
                    match self.prompt("Please enter the file path of the image:")? {
                        Some(path) => ImageSource::File(PathBuf::from(path)),
                        None => return Ok(()),
                    }
                }
                Some(MenuChoice::AnalyzeUrl) => {
                    match self.prompt("Please enter the URL of the image:")? {
                        Some(url) => ImageSource::Url(url),
                        None => return Ok(()),
                    }
                }
                None => {
                    writeln!(self.output, "Invalid choice, please try again.")?;
                    continue;
                }
            };

            match self.analyze_source(&source).await {
                Ok(true) => {}
                Ok(false) => return Ok(()),
                Err(ServiceError::NotFound(path)) => {
                    info!(path = %path.display(), "image file not found");
                    writeln!(
                        self.output,
                        "File not found. Please check the path and try again."
                    )?;
                }
                Err(err) => {
                    error!("{err}");
                    writeln!(self.output, "Error: {err}")?;
                }
            }
        }
    }

    /// Acquire, analyze, render and optionally thumbnail one image.
    ///
    /// Returns `Ok(false)` when the input ended mid-operation.
    async fn analyze_source(&mut self, source: &ImageSource) -> Result<bool, ServiceError> {
        let image_path =
            input::acquire(source, &self.http, &self.settings.download_path).await?;
        if let ImageSource::Url(_) = source {
            self.say(format!("Image downloaded and saved as {}", image_path.display()))?;
        }

        self.say(format!("Analyzing {}", image_path.display()))?;
        let result = self.analyzer.analyze(&image_path).await?;
        info!(
            captions = result.captions.len(),
            tags = result.tags.len(),
            objects = result.objects.len(),
            "analysis complete"
        );

        render::render_report(&mut self.output, &result, &image_path, &self.renderer)?;

        let Some(answer) = self.ask("Do you want to create a thumbnail? (y/n)")? else {
            return Ok(false);
        };
        if !answer.trim().eq_ignore_ascii_case("y") {
            return Ok(true);
        }

        let Some(width) = self.ask("Enter the width of the thumbnail:")? else {
            return Ok(false);
        };
        let width = thumbnail::parse_dimension("width", &width)?;
        let Some(height) = self.ask("Enter the height of the thumbnail:")? else {
            return Ok(false);
        };
        let height = thumbnail::parse_dimension("height", &height)?;
        let Some(name) =
            self.ask("Enter the name of the thumbnail (remember to put .jpg at the end)")?
        else {
            return Ok(false);
        };

        let request = ThumbnailRequest::with_size(width, height, &name)?;
        let path = thumbnail::create_thumbnail(
            &image_path,
            &request,
            &self.settings.thumbnail_directory,
        )?;
        self.say(format!("Thumbnail created and saved in {}", path.display()))?;
        Ok(true)
    }

    fn say(&mut self, message: String) -> Result<(), ServiceError> {
        writeln!(self.output, "{message}").map_err(|err| ServiceError::io("<console>", err))
    }

    fn ask(&mut self, question: &str) -> Result<Option<String>, ServiceError> {
        self.prompt(question)
            .map_err(|err| ServiceError::io("<console>", err))
    }

    fn prompt(&mut self, question: &str) -> std::io::Result<Option<String>> {
        writeln!(self.output, "{question}")?;
        self.read_line()
    }

    fn read_line(&mut self) -> std::io::Result<Option<String>> {
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
