use crate::model::{Author, Content, Post};
use crate::{Error, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const DEFAULT_SEPARATOR: char = ';';

// Written up front so an empty batch still yields a header row
const POST_HEADER: [&str; 3] = ["url", "content", "author_url"];
const AUTHOR_HEADER: [&str; 3] = ["url", "name", "description"];
const CONTENT_HEADER: [&str; 6] = [
    "post.url",
    "post.content",
    "post.author_url",
    "author.url",
    "author.name",
    "author.description",
];

#[derive(Serialize)]
struct PostRow<'a> {
    url: &'a str,
    content: &'a str,
    author_url: &'a str,
}

impl<'a> From<&'a Post> for PostRow<'a> {
    fn from(post: &'a Post) -> Self {
        Self {
            url: &post.url,
            content: &post.content,
            author_url: &post.author_url,
        }
    }
}

#[derive(Serialize)]
struct AuthorRow<'a> {
    url: &'a str,
    name: &'a str,
    description: &'a str,
}

impl<'a> From<&'a Author> for AuthorRow<'a> {
    fn from(author: &'a Author) -> Self {
        Self {
            url: &author.url,
            name: &author.name,
            description: &author.description,
        }
    }
}

#[derive(Serialize)]
struct ContentRow<'a> {
    #[serde(rename = "post.url")]
    post_url: &'a str,
    #[serde(rename = "post.content")]
    post_content: &'a str,
    #[serde(rename = "post.author_url")]
    post_author_url: &'a str,
    #[serde(rename = "author.url")]
    author_url: &'a str,
    #[serde(rename = "author.name")]
    author_name: &'a str,
    #[serde(rename = "author.description")]
    author_description: &'a str,
}

impl<'a> From<&'a Content> for ContentRow<'a> {
    fn from(content: &'a Content) -> Self {
        Self {
            post_url: &content.post.url,
            post_content: &content.post.content,
            post_author_url: &content.post.author_url,
            author_url: &content.author.url,
            author_name: &content.author.name,
            author_description: &content.author.description,
        }
    }
}

/// Writes records as delimited text with a header row.
pub struct CsvExporter {
    delimiter: u8,
}

impl CsvExporter {
    /// Create an exporter using a single ASCII separator character
    pub fn new(separator: char) -> Result<Self> {
        if !separator.is_ascii() || separator == '"' || separator == '\n' || separator == '\r' {
            return Err(Error::InvalidSeparator(format!(
                "'{}' cannot be used as a field separator",
                separator.escape_default()
            )));
        }
        Ok(Self {
            delimiter: separator as u8,
        })
    }

    /// Parse a separator given as a string (e.g. from a CLI flag)
    pub fn from_separator_str(separator: &str) -> Result<Self> {
        let mut chars = separator.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::new(c),
            _ => Err(Error::InvalidSeparator(format!(
                "expected exactly one character, got '{}'",
                separator
            ))),
        }
    }

    pub fn write_posts<W: Write>(&self, posts: &[Post], writer: W) -> Result<()> {
        self.write_rows(&POST_HEADER, posts.iter().map(PostRow::from), writer)
    }

    pub fn write_authors<W: Write>(&self, authors: &[Author], writer: W) -> Result<()> {
        self.write_rows(&AUTHOR_HEADER, authors.iter().map(AuthorRow::from), writer)
    }

    pub fn write_contents<W: Write>(&self, contents: &[Content], writer: W) -> Result<()> {
        self.write_rows(&CONTENT_HEADER, contents.iter().map(ContentRow::from), writer)
    }

    /// Write contents to a `.csv` file. The extension is checked before the
    /// file is created.
    pub fn contents_to_file(&self, contents: &[Content], path: &Path) -> Result<()> {
        tracing::debug!("Writing CSV file to: {}", path.display());

        ensure_csv_extension(path)?;
        let file = File::create(path)?;
        self.write_contents(contents, BufWriter::new(file))?;

        tracing::info!(
            "Successfully wrote {} records to {}",
            contents.len(),
            path.display()
        );

        Ok(())
    }

    pub fn posts_to_string(&self, posts: &[Post]) -> Result<String> {
        let mut buf = Vec::new();
        self.write_posts(posts, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub fn authors_to_string(&self, authors: &[Author]) -> Result<String> {
        let mut buf = Vec::new();
        self.write_authors(authors, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn write_rows<W, T, I>(&self, header: &[&str], rows: I, writer: W) -> Result<()>
    where
        W: Write,
        T: Serialize,
        I: IntoIterator<Item = T>,
    {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .from_writer(writer);

        csv_writer.write_record(header)?;
        for row in rows {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;

        Ok(())
    }
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_SEPARATOR as u8,
        }
    }
}

/// Only `.csv` output files are accepted (case-insensitive).
pub fn ensure_csv_extension(path: &Path) -> Result<()> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if !is_csv {
        return Err(Error::InvalidOutput(format!(
            "invalid file format for output, got {}, but only supported is .csv",
            path.display()
        )));
    }
    Ok(())
}
