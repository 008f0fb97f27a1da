use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{delete, get, put, web, App, HttpResponse, HttpServer, Responder};

use clap::Parser;
use log::{info, warn};
use serde::Deserialize;
use markov_gen_core::io::{list_files, normalize_folder};
use markov_gen_core::{ChainConfig, ChainModel};

/// Upper bound on sentences returned by a single `/v1/generate` call
const MAX_SENTENCES: usize = 100;

/// Command-line settings of the server
#[derive(Parser)]
#[command(name = "markov-gen-server")]
#[command(about = "HTTP front end for a shared Markov chain")]
struct Args {
	/// Address to bind
	#[arg(long, default_value = "127.0.0.1")]
	host: String,

	/// Port to bind
	#[arg(long, default_value_t = 5000)]
	port: u16,

	/// Folder holding `<name>.txt` corpora
	#[arg(long, default_value = "./data")]
	data_dir: String,

	/// Seed for reproducible output
	#[arg(long)]
	seed: Option<u64>,

	/// Maximum words per sentence (0 disables the bound)
	#[arg(long, default_value_t = 200)]
	max_words: usize,
}

impl Args {
	fn chain_config(&self) -> markov_gen_core::Result<ChainConfig> {
		let mut config = ChainConfig::new(self.seed);
		config.set_max_words(Some(self.max_words).filter(|&max| max > 0))?;
		Ok(config)
	}
}

/// Struct representing query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	count: Option<usize>,
}

#[derive(Deserialize)]
struct CorpusQuery {
	names: Option<String>,
}

struct SharedData {
	model: ChainModel,
	data_dir: PathBuf,
}

impl SharedData {
	fn new(config: ChainConfig, data_dir: PathBuf) -> Self {
		Self { model: ChainModel::with_config(config), data_dir }
	}
}

/// Path of the corpus `name` inside `data_dir`.
///
/// Returns `None` unless `name` is a single plain file stem, so a request
/// can never reach outside the data folder.
fn corpus_path(data_dir: &Path, name: &str) -> Option<PathBuf> {
	if name.contains(['/', '\\']) {
		return None;
	}
	let mut components = Path::new(name).components();
	match (components.next(), components.next()) {
		(Some(Component::Normal(_)), None) => Some(data_dir.join(format!("{name}.txt"))),
		_ => None,
	}
}

impl GenerateParams {
	/// Number of sentences to generate.
	fn count(&self) -> Result<usize, String> {
		match self.count {
			None => Ok(1),
			Some(0) => Err("Count must be at least 1".into()),
			Some(n) if n > MAX_SENTENCES => Err(format!("Count must be at most {MAX_SENTENCES}")),
			Some(n) => Ok(n),
		}
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates `count` sentences (default 1) from the shared chain,
/// one per line. An empty chain yields empty lines.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let count = match query.count() {
		Ok(c) => c,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	HttpResponse::Ok().body(shared_data.model.generate_sentences(count).join("\n"))
}

/// HTTP PUT endpoint `/v1/ingest`
///
/// Feeds every line of the request body into the chain.
#[put("/v1/ingest")]
async fn put_ingest(data: web::Data<Mutex<SharedData>>, body: String) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let summary = shared_data.model.ingest_lines(body.lines());
	info!("Ingested request body: {} lines, {} tokens", summary.lines, summary.tokens);
	HttpResponse::Ok().json(summary)
}

#[get("/v1/corpora")]
async fn get_corpora(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let data_dir = match data.lock() {
		Ok(m) => m.data_dir.clone(),
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	match list_files(&data_dir, "txt") {
		Ok(files) => HttpResponse::Ok().body(files.join("\n")),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list corpora"),
	}
}

/// HTTP PUT endpoint `/v1/load?names=a,b`
///
/// Ingests `<data_dir>/<name>.txt` for each name, in order.
/// Unreadable corpora and names that are not a plain file stem are
/// reported and skipped.
#[put("/v1/load")]
async fn put_load(data: web::Data<Mutex<SharedData>>, query: web::Query<CorpusQuery>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let query_names = match &query.names {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty corpus name"),
	};

	let names: Vec<&str> = query_names
		.split(',')
		.map(|s| s.trim())
		.filter(|s| !s.is_empty())
		.collect();

	let mut report = Vec::with_capacity(names.len());
	for name in names {
		let Some(path) = corpus_path(&shared_data.data_dir, name) else {
			warn!("Rejected corpus name {name:?}");
			report.push(format!("{name}: invalid corpus name"));
			continue;
		};
		match shared_data.model.ingest_file(&path) {
			Ok(summary) => report.push(format!("{name}: {} lines, {} tokens", summary.lines, summary.tokens)),
			Err(e) => {
				warn!("{e}");
				report.push(format!("{name}: {e}"));
			}
		}
	}

	HttpResponse::Ok().body(report.join("\n"))
}

#[get("/v1/chain")]
async fn get_chain(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	match data.lock() {
		Ok(m) => HttpResponse::Ok().body(m.model.to_string()),
		Err(_) => HttpResponse::InternalServerError().body("Model lock failed"),
	}
}

#[get("/v1/stats")]
async fn get_stats(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	match data.lock() {
		Ok(m) => HttpResponse::Ok().json(m.model.stats()),
		Err(_) => HttpResponse::InternalServerError().body("Model lock failed"),
	}
}

/// HTTP DELETE endpoint `/v1/chain`
///
/// Drops everything ingested so far.
#[delete("/v1/chain")]
async fn delete_chain(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let config = shared_data.model.config().clone();
	shared_data.model = ChainModel::with_config(config);
	HttpResponse::Ok().body("Chain cleared")
}

/// Registers every endpoint on an app.
fn routes(cfg: &mut web::ServiceConfig) {
	cfg.service(get_generated)
		.service(put_ingest)
		.service(get_corpora)
		.service(put_load)
		.service(get_chain)
		.service(get_stats)
		.service(delete_chain);
}

/// Main entry point for the server.
///
/// Builds an empty chain, wraps it in a `Mutex` so ingestion and
/// generation never overlap, and starts an Actix-web HTTP server.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();
	let args = Args::parse();

	let config = args.chain_config().map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
	let shared_data = SharedData::new(config, normalize_folder(&args.data_dir));
	let shared_model = web::Data::new(Mutex::new(shared_data));

	info!("Listening on {}:{}", args.host, args.port);
	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_model.clone())
			.configure(routes)
	})
		.bind((args.host.as_str(), args.port))?
		.run()
		.await
}
