//! The import resolver.
//!
//! An import directive `! <source>` names a system import (from the
//! built-in registry), a relative or absolute filename, or an HTTP(S) URL.
//! The referenced document is loaded — recursively resolving its own
//! imports — and only its ttype definitions are kept; its value, custom
//! text, and comment are discarded.
//!
//! Relative filenames are searched for in the importing file's directory,
//! then each entry of the `UXF_PATH` environment variable, then the
//! current directory. Sources ending in `.gz` (or starting with the gzip
//! magic bytes) are transparently decompressed. Cycles are detected by
//! keeping the set of sources currently being resolved.

use crate::error::{Error, Result};
use crate::event::{self, Event};
use crate::parser::{parse_text, ParseOptions};
use crate::tclass::TClass;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Resolves one import directive, returning the imported ttypes in their
/// definition order.
#[allow(clippy::too_many_arguments)]
pub(crate) fn resolve(
    source: &str,
    importer_dir: Option<&Path>,
    line: usize,
    filename: &str,
    options: &ParseOptions,
    on_event: &mut dyn FnMut(&Event) -> Result<()>,
    actives: &mut Vec<String>,
) -> Result<Vec<TClass>> {
    debug!(source, filename, "resolving import");
    let fail = |on_event: &mut dyn FnMut(&Event) -> Result<()>,
                code: &'static str,
                message: String| {
        let event = Event::error(line, code, message, filename);
        on_event(&event)?;
        Err(Error::Fatal(event))
    };

    let fetched = match classify(source) {
        Source::System => match system_source(source) {
            Some(text) => Fetched {
                id: format!("uxf:{source}"),
                name: source.to_string(),
                text: text.to_string(),
            },
            None => {
                return fail(
                    on_event,
                    event::E_IMP_NOT_FOUND,
                    format!("no system import is called {source}"),
                )
            }
        },
        Source::Url => match fetch_url(source, options) {
            Ok(bytes) => match decode(bytes, source) {
                Ok(text) => Fetched {
                    id: source.to_string(),
                    name: source.to_string(),
                    text,
                },
                Err((code, message)) => return fail(on_event, code, message),
            },
            Err(message) => return fail(on_event, event::E_IMP_NET, message),
        },
        Source::File => match find_file(source, importer_dir) {
            Some(path) => {
                let id = path
                    .canonicalize()
                    .unwrap_or_else(|_| path.clone())
                    .to_string_lossy()
                    .into_owned();
                let bytes = match std::fs::read(&path) {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        return fail(
                            on_event,
                            event::E_IMP_NOT_FOUND,
                            format!("failed to read import {source}: {err}"),
                        )
                    }
                };
                match decode(bytes, source) {
                    Ok(text) => Fetched {
                        id,
                        name: path.to_string_lossy().into_owned(),
                        text,
                    },
                    Err((code, message)) => return fail(on_event, code, message),
                }
            }
            None => {
                return fail(
                    on_event,
                    event::E_IMP_NOT_FOUND,
                    format!("import {source} was not found on any search path"),
                )
            }
        },
    };

    if actives.contains(&fetched.id) {
        return fail(
            on_event,
            event::E_IMP_CYCLE,
            format!("circular import of {source} via {}", fetched.id),
        );
    }
    actives.push(fetched.id);
    let parsed = parse_text(&fetched.text, &fetched.name, options, on_event, actives, true);
    actives.pop();
    let doc = parsed?;
    Ok(doc.tclasses().values().cloned().collect())
}

enum Source {
    System,
    File,
    Url,
}

fn classify(source: &str) -> Source {
    if source.starts_with("http://") || source.starts_with("https://") {
        Source::Url
    } else if !source.contains('.') && !source.contains('/') && !source.contains('\\') {
        Source::System
    } else {
        Source::File
    }
}

struct Fetched {
    /// Canonical identity used for cycle detection.
    id: String,
    /// Name reported in diagnostics from the imported document.
    name: String,
    text: String,
}

/// Search order for relative imports: the importing file's directory,
/// each `UXF_PATH` entry, then the current directory.
fn find_file(source: &str, importer_dir: Option<&Path>) -> Option<PathBuf> {
    let path = Path::new(source);
    if path.is_absolute() {
        return path.is_file().then(|| path.to_path_buf());
    }
    let mut dirs: Vec<PathBuf> = Vec::new();
    if let Some(dir) = importer_dir {
        dirs.push(dir.to_path_buf());
    }
    if let Some(uxf_path) = std::env::var_os("UXF_PATH") {
        dirs.extend(std::env::split_paths(&uxf_path));
    }
    dirs.push(PathBuf::from("."));
    dirs.into_iter()
        .map(|dir| dir.join(source))
        .find(|candidate| candidate.is_file())
}

fn fetch_url(url: &str, options: &ParseOptions) -> std::result::Result<Vec<u8>, String> {
    debug!(url, "fetching import over http");
    let client = reqwest::blocking::Client::builder()
        .timeout(options.http_timeout)
        .build()
        .map_err(|err| err.to_string())?;
    let response = client.get(url).send().map_err(|err| err.to_string())?;
    if !response.status().is_success() {
        return Err(format!("{url} answered {}", response.status()));
    }
    let bytes = response.bytes().map_err(|err| err.to_string())?;
    Ok(bytes.to_vec())
}

/// Gunzips when the payload looks gzipped (magic bytes or `.gz` suffix),
/// then insists on UTF-8.
pub(crate) fn decode(
    bytes: Vec<u8>,
    source: &str,
) -> std::result::Result<String, (&'static str, String)> {
    let bytes = if bytes.starts_with(&GZIP_MAGIC) || source.ends_with(".gz") {
        let mut out = Vec::new();
        flate2::read::GzDecoder::new(bytes.as_slice())
            .read_to_end(&mut out)
            .map_err(|err| {
                (
                    event::E_IMP_GZIP,
                    format!("failed to gunzip {source}: {err}"),
                )
            })?;
        out
    } else {
        bytes
    };
    String::from_utf8(bytes).map_err(|_| {
        (
            event::E_IMP_NOT_FOUND,
            format!("import {source} is not UTF-8 encoded"),
        )
    })
}

/// The built-in system imports. These are complete (if payload-free) UXF
/// documents; only their ttypes matter.
fn system_source(name: &str) -> Option<&'static str> {
    match name {
        "complex" => Some(
            "uxf 1.0 complex\n\
             =Complex Real:real Imag:real\n\
             []\n",
        ),
        "fraction" => Some(
            "uxf 1.0 fraction\n\
             =Fraction numerator:int denominator:int\n\
             []\n",
        ),
        "numeric" => Some(
            "uxf 1.0 numeric\n\
             =Complex Real:real Imag:real\n\
             =Fraction numerator:int denominator:int\n\
             []\n",
        ),
        "ttype-test" => Some(
            "uxf 1.0 ttype-test\n\
             =IntPair first:int second:int\n\
             =Point2D x:real y:real\n\
             =Categories CID:int Title:str Selected:bool\n\
             =Playlist Title:str Tracks:list When:datetime\n\
             =Untyped alpha beta\n\
             =Dehydrated\n\
             []\n",
        ),
        _ => None,
    }
}
