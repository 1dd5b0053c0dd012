use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, put, web};

use pen_core::io::list_files;
use pen_core::model::{Pen, Token, token};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;

/// Query parameters for the `/v1/generate` endpoint.
#[derive(Deserialize)]
struct GenerateParams {
	relevant: Option<usize>,
	count: Option<usize>,
	seed: Option<u64>,
	from: Option<usize>,
}

/// Query parameters for the sample-based query endpoints.
#[derive(Deserialize)]
struct SampleQuery {
	sample: Option<String>,
}

/// Query parameters for the corpus loading endpoint.
#[derive(Deserialize)]
struct CorpusQuery {
	name: Option<String>,
}

struct SharedData {
	pen: Option<Pen>,
	name: Option<String>,
}

impl SampleQuery {
	/// Parses the comma-separated sample into tokens.
	///
	/// An empty element is the empty token; the literal `~` stands for the
	/// absent token.
	fn tokens(&self) -> Result<Vec<Token>, String> {
		match &self.sample {
			None => Err("Missing 'sample' query parameter".to_owned()),
			Some(s) => Ok(s
				.split(',')
				.map(|part| if part == "~" { None } else { token(part) })
				.collect()),
		}
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Renders up to `count` tokens from the loaded corpus using a context
/// window of `relevant` tokens. With `seed` the render is deterministic;
/// `from` starts by copying tokens out of the corpus at that position.
#[get("/v1/generate")]
async fn get_generated(
	data: web::Data<Mutex<SharedData>>,
	query: web::Query<GenerateParams>,
) -> impl Responder {
	let relevant = query.relevant.unwrap_or(2);
	let count = query.count.unwrap_or(64);

	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("State lock failed"),
	};
	let pen = match &shared_data.pen {
		Some(pen) => pen,
		None => return HttpResponse::BadRequest().body("No corpus loaded"),
	};

	let rendered: Result<Vec<Token>, _> = match query.seed {
		Some(seed) => {
			let mut rng = StdRng::seed_from_u64(seed);
			match pen.render_with_rng(relevant, &mut rng, query.from) {
				Ok(render) => render.take(count).collect(),
				Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
			}
		}
		None => match pen.render_random(relevant, query.from) {
			Ok(render) => render.take(count).collect(),
			Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
		},
	};

	match rendered {
		Ok(tokens) => {
			let text = tokens
				.iter()
				.map(|t| t.as_deref().unwrap_or("~"))
				.collect::<Vec<_>>()
				.join(" ");
			HttpResponse::Ok().body(text)
		}
		Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
	}
}

/// HTTP GET endpoint `/v1/corpora`
///
/// Lists the corpus files available under `./data`.
#[get("/v1/corpora")]
async fn get_corpora() -> impl Responder {
	match list_files("./data", "txt") {
		Ok(files) => HttpResponse::Ok().body(files.join("\n").replace(".txt", "")),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list corpora"),
	}
}

/// HTTP GET endpoint `/v1/loaded`
///
/// Names the currently loaded corpus, if any.
#[get("/v1/loaded")]
async fn get_loaded(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("State lock failed"),
	};
	match &shared_data.name {
		Some(name) => HttpResponse::Ok().body(name.clone()),
		None => HttpResponse::Ok().body(""),
	}
}

/// HTTP PUT endpoint `/v1/load_corpus`
///
/// Loads `./data/<name>.txt`, replacing the current corpus. A cached
/// snapshot next to the text file is used when present.
#[put("/v1/load_corpus")]
async fn put_corpus(
	data: web::Data<Mutex<SharedData>>,
	query: web::Query<CorpusQuery>,
) -> impl Responder {
	let name = match &query.name {
		Some(s) if !s.trim().is_empty() => s.trim().to_owned(),
		_ => return HttpResponse::BadRequest().body("Missing or empty corpus name"),
	};

	let pen = match Pen::load(format!("./data/{}.txt", name)) {
		Ok(pen) => pen,
		Err(e) => {
			return HttpResponse::InternalServerError()
				.body(format!("Failed to load corpus: {e}"));
		}
	};
	log::info!("loaded corpus '{}' ({} tokens)", name, pen.len());

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("State lock failed"),
	};
	shared_data.pen = Some(pen);
	shared_data.name = Some(name);
	HttpResponse::Ok().body("Corpus loaded successfully")
}

/// HTTP GET endpoint `/v1/count`
///
/// Number of occurrences of the comma-separated sample.
#[get("/v1/count")]
async fn get_count(
	data: web::Data<Mutex<SharedData>>,
	query: web::Query<SampleQuery>,
) -> impl Responder {
	let sample = match query.tokens() {
		Ok(sample) => sample,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("State lock failed"),
	};
	match &shared_data.pen {
		Some(pen) => HttpResponse::Ok().body(pen.count(&sample).to_string()),
		None => HttpResponse::BadRequest().body("No corpus loaded"),
	}
}

/// HTTP GET endpoint `/v1/positions`
///
/// All start positions of the comma-separated sample, ascending.
#[get("/v1/positions")]
async fn get_positions(
	data: web::Data<Mutex<SharedData>>,
	query: web::Query<SampleQuery>,
) -> impl Responder {
	let sample = match query.tokens() {
		Ok(sample) => sample,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("State lock failed"),
	};
	match &shared_data.pen {
		Some(pen) => {
			let mut positions: Vec<usize> = pen.positions_of(&sample).into_iter().collect();
			positions.sort_unstable();
			let body = positions
				.iter()
				.map(usize::to_string)
				.collect::<Vec<_>>()
				.join(",");
			HttpResponse::Ok().body(body)
		}
		None => HttpResponse::BadRequest().body("No corpus loaded"),
	}
}

/// Main entry point for the server.
///
/// Wraps the shared corpus state in a `Mutex` and starts an Actix-web HTTP
/// server with the generation and query endpoints.
///
/// # Notes
/// - The server binds to 127.0.0.1:5000.
/// - Corpora are looked up under `./data`; load one with
///   `PUT /v1/load_corpus?name=<corpus>` before generating.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();

	let shared_data = SharedData { pen: None, name: None };
	let shared_pen = web::Data::new(Mutex::new(shared_data));
	log::info!("listening on 127.0.0.1:5000");

	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_pen.clone())
			.service(get_generated)
			.service(get_corpora)
			.service(get_loaded)
			.service(put_corpus)
			.service(get_count)
			.service(get_positions)
	})
	.bind(("127.0.0.1", 5000))?
	.run()
	.await
}
