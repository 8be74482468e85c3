use annclust::{
    read_vectors, AssignmentKind, Config, Init, Metric, Orchestrator, RunParams, UpdateKind,
};
use clap::{App, Arg};
use log::{error, info, warn};
use std::io::{self, Write};

fn prompt(label: &str) -> String {
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).expect("failed to read stdin");
    buf.trim().to_string()
}

fn main() {
    env_logger::init();

    let matches = App::new("annclust")
        .about("Approximate and exact clustering over LSH/Hypercube-accelerated search")
        .arg(Arg::with_name("input").short("i").takes_value(true).help("input vector file"))
        .arg(Arg::with_name("config").short("c").takes_value(true).help("TOML config file"))
        .arg(Arg::with_name("output").short("o").takes_value(true).help("output report file"))
        .arg(
            Arg::with_name("metric")
                .short("d")
                .takes_value(true)
                .possible_values(&["euclidean", "cosine"])
                .help("distance metric"),
        )
        .arg(Arg::with_name("complete").long("complete").help("dump full cluster membership"))
        .arg(Arg::with_name("seed").long("seed").takes_value(true).help("RNG seed"))
        .get_matches();

    let config = match matches.value_of("config") {
        Some(path) => match Config::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                error!("could not parse config: {}", e);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    let input_path = matches
        .value_of("input")
        .map(String::from)
        .unwrap_or_else(|| prompt("input vector file"));

    let vectors = match read_vectors(&input_path, config.csv_delimiter, 1) {
        Ok(v) => v,
        Err(e) => {
            error!("could not open input: {}", e);
            std::process::exit(1);
        }
    };

    let k = config.number_of_clusters.unwrap_or_else(|| {
        prompt("number of clusters")
            .parse()
            .expect("number of clusters must be an integer")
    });

    let metric_str = matches
        .value_of("metric")
        .map(String::from)
        .unwrap_or_else(|| prompt("metric (euclidean|cosine)"));
    let metric = match metric_str.as_str() {
        "cosine" => Metric::Cosine,
        _ => Metric::Euclidean,
    };

    let seed: u64 = matches
        .value_of("seed")
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);

    let complete = matches.is_present("complete");

    let base_params = RunParams {
        k,
        metric,
        max_iter: config.max_algo_iterations,
        min_dist_kmeans: config.min_dist_kmeans,
        init: Init::Random,
        assignment: AssignmentKind::Lloyd,
        update: UpdateKind::KMeans,
        seed,
        l: config.number_of_hash_tables,
        k_hash: config.number_of_hash_functions,
        bucket_div: config.lsh_bucket_div,
        euclidean_h_w: config.euclidean_h_w,
        cube_probes: config.cube_probes,
    };

    let inits = [Init::Random, Init::KMeansPlusPlus];
    let assignments = [AssignmentKind::Lloyd, AssignmentKind::Lsh, AssignmentKind::Hypercube];
    let updates = [UpdateKind::KMeans, UpdateKind::Pam];

    let mut reports = Vec::new();
    for &init in &inits {
        for &assignment in &assignments {
            for &update in &updates {
                let params = RunParams {
                    init,
                    assignment,
                    update,
                    ..clone_params(&base_params)
                };
                let mut orchestrator = Orchestrator::new(vectors.clone());
                info!("running triple init={:?} assignment={:?} update={:?}", init, assignment, update);
                match orchestrator.run(&params, complete) {
                    Ok(report) => reports.push(report.to_string()),
                    Err(e) => {
                        warn!("triple failed, skipping: {}", e);
                    }
                }
            }
        }
    }

    let rendered = reports.join("\n\n");
    match matches.value_of("output") {
        Some(path) => {
            if let Err(e) = std::fs::write(path, &rendered) {
                error!("could not write output: {}", e);
                std::process::exit(1);
            }
        }
        None => println!("{}", rendered),
    }
}

fn clone_params(p: &RunParams) -> RunParams {
    RunParams {
        k: p.k,
        metric: p.metric,
        max_iter: p.max_iter,
        min_dist_kmeans: p.min_dist_kmeans,
        init: p.init,
        assignment: p.assignment,
        update: p.update,
        seed: p.seed,
        l: p.l,
        k_hash: p.k_hash,
        bucket_div: p.bucket_div,
        euclidean_h_w: p.euclidean_h_w,
        cube_probes: p.cube_probes,
    }
}
