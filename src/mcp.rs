use anyhow::Result;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_router,
};
use serde::{Deserialize, Serialize};

use crate::error::ServiceResult;
use crate::page_range::{self, Strictness};
use crate::pdf::PdfDocument;
use crate::pdf::text::extract_text_pages;

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfOrganizeRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Page order (e.g., '1,3,2,4-7'); pages may repeat")]
    pub pages: String,
    #[schemars(description = "Output file path")]
    pub output: String,
    #[schemars(description = "Reject out-of-range pages and reversed ranges (default: false)")]
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfSplitRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "First page, 1-based and inclusive")]
    pub start: i64,
    #[schemars(description = "Last page, 1-based and inclusive")]
    pub end: i64,
    #[schemars(description = "Output file path")]
    pub output: String,
    #[schemars(description = "Clamp the range to the document instead of failing (default: false)")]
    #[serde(default)]
    pub lenient: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfCropRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Margin in points removed from every side (default: 50)")]
    #[serde(default = "default_margin")]
    pub margin: i64,
    #[schemars(description = "Output file path")]
    pub output: String,
    #[schemars(description = "Refuse margins that would invert a page (default: false)")]
    #[serde(default)]
    pub strict: bool,
}

fn default_margin() -> i64 {
    50
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfReadTextRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Page selection (e.g., '1-5,10'); all pages when omitted")]
    #[serde(default)]
    pub pages: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PdfServer {
    #[allow(dead_code)]
    tool_router: ToolRouter<Self>,
}

impl PdfServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }
}

impl Default for PdfServer {
    fn default() -> Self {
        Self::new()
    }
}

fn strictness(strict: bool) -> Strictness {
    if strict {
        Strictness::Strict
    } else {
        Strictness::Lenient
    }
}

/// Render a tool outcome the way MCP clients read it: JSON or an error line.
fn respond<T: Serialize>(result: ServiceResult<T>) -> String {
    match result {
        Ok(value) => {
            serde_json::to_string_pretty(&value).unwrap_or_else(|e| format!("Error: {}", e))
        }
        Err(e) => format!("Error: {}", e),
    }
}

#[tool_router]
impl PdfServer {
    #[tool(description = "Get PDF metadata including title, author, creator, producer, creation date, and page count")]
    fn pdf_info(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        respond(PdfDocument::open(&path).map(|doc| {
            let info = doc.get_info();
            PdfInfoResult {
                path,
                page_count: info.page_count,
                title: info.title,
                author: info.author,
                creator: info.creator,
                producer: info.producer,
                creation_date: info.creation_date,
                subject: info.subject,
                keywords: info.keywords,
            }
        }))
    }

    #[tool(description = "Reorder, drop, or duplicate pages of a PDF and save the result. Use page order syntax like '1,3,2,4-7'.")]
    fn pdf_organize(&self, Parameters(req): Parameters<PdfOrganizeRequest>) -> String {
        respond(organize_to_file(&req))
    }

    #[tool(description = "Extract the inclusive page range start..end of a PDF into a new file")]
    fn pdf_split(&self, Parameters(req): Parameters<PdfSplitRequest>) -> String {
        respond(split_to_file(&req))
    }

    #[tool(description = "Shrink every page of a PDF by a margin (in points) on all four sides")]
    fn pdf_crop(&self, Parameters(req): Parameters<PdfCropRequest>) -> String {
        respond(crop_to_file(&req))
    }

    #[tool(description = "Extract the text of a PDF, page by page. Optionally restrict to a page selection like '1-5,10'.")]
    fn pdf_read_text(&self, Parameters(req): Parameters<PdfReadTextRequest>) -> String {
        respond(read_text(&req.path, req.pages.as_deref()))
    }
}

fn organize_to_file(req: &PdfOrganizeRequest) -> ServiceResult<OutputResult> {
    let doc = PdfDocument::open(&req.path)?;
    let mut organized = doc.organize(&req.pages, strictness(req.strict))?;
    let page_count = organized.get_pages().len() as u32;
    PdfDocument::save(&mut organized, &req.output)?;
    Ok(OutputResult {
        output_path: req.output.clone(),
        page_count,
    })
}

fn split_to_file(req: &PdfSplitRequest) -> ServiceResult<OutputResult> {
    let doc = PdfDocument::open(&req.path)?;
    let mut extracted = doc.split(req.start, req.end, strictness(!req.lenient))?;
    let page_count = extracted.get_pages().len() as u32;
    PdfDocument::save(&mut extracted, &req.output)?;
    Ok(OutputResult {
        output_path: req.output.clone(),
        page_count,
    })
}

fn crop_to_file(req: &PdfCropRequest) -> ServiceResult<OutputResult> {
    let mut doc = PdfDocument::open(&req.path)?;
    doc.crop(req.margin as f32, strictness(req.strict))?;
    let page_count = doc.page_count();
    PdfDocument::save(&mut doc.doc, &req.output)?;
    Ok(OutputResult {
        output_path: req.output.clone(),
        page_count,
    })
}

fn read_text(path: &str, pages: Option<&str>) -> ServiceResult<Vec<PageTextResult>> {
    let data = std::fs::read(path)?;
    let page_count = PdfDocument::from_bytes(&data)?.page_count();
    let texts = extract_text_pages(&data)?;

    let wanted = match pages {
        Some(expression) => {
            let selected = page_range::parse(expression, Strictness::Strict)?;
            page_range::resolve(&selected, page_count, Strictness::Strict)?
        }
        None => (1..=page_count).collect(),
    };

    // Extraction may stop short of the last page
    Ok(wanted
        .into_iter()
        .map(|page| PageTextResult {
            page,
            text: texts
                .get(page as usize - 1)
                .map(|t| t.text.clone())
                .unwrap_or_default(),
        })
        .collect())
}

// Result types for MCP tools

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PdfInfoResult {
    pub path: String,
    pub page_count: u32,
    pub title: Option<String>,
    pub author: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PageTextResult {
    pub page: u32,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct OutputResult {
    pub output_path: String,
    pub page_count: u32,
}

impl ServerHandler for PdfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "PDF page tools. Use pdf_info for document metadata, pdf_organize to reorder or \
                 duplicate pages, pdf_split to extract a page range, pdf_crop to trim margins, and \
                 pdf_read_text to read page text."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server() -> Result<()> {
    let server = PdfServer::new();

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}
