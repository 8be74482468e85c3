use annclust::{
    read_vectors, AssignmentKind, Config, Init, Metric, Orchestrator, RunParams, UpdateKind,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_fixture(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

fn base_params(k: usize, metric: Metric) -> RunParams {
    RunParams {
        k,
        metric,
        max_iter: 30,
        min_dist_kmeans: 0.05,
        init: Init::Random,
        assignment: AssignmentKind::Lloyd,
        update: UpdateKind::KMeans,
        seed: 7,
        l: 3,
        k_hash: 3,
        bucket_div: 4,
        euclidean_h_w: 0.5,
        cube_probes: 0,
    }
}

#[test]
fn test_scenario_one_two_clusters_converges_and_scores_high_silhouette() {
    let file = write_fixture("header\nA,0.0,0.0\nB,0.0,1.0\nC,10.0,0.0\nD,10.0,1.0\n");
    let vectors = read_vectors(file.path(), ',', 1).unwrap();
    assert_eq!(vectors.len(), 4);

    let mut orchestrator = Orchestrator::new(vectors);
    let params = base_params(2, Metric::Euclidean);
    let report = orchestrator.run(&params, true).unwrap();

    assert_eq!(report.clusters.len(), 2);
    let sizes: Vec<usize> = report.clusters.iter().map(|c| c.size).collect();
    assert_eq!(sizes.iter().sum::<usize>(), 4);
    // overall silhouette is the last entry.
    let overall = *report.silhouette.last().unwrap();
    assert!(overall > 0.7, "expected well separated clusters, got {}", overall);
}

#[test]
fn test_scenario_two_cosine_opposite_directions() {
    let file = write_fixture("header\nA,1.0,0.0\nB,-1.0,0.0\nC,0.0,1.0\nD,0.0,-1.0\n");
    let vectors = read_vectors(file.path(), ',', 1).unwrap();

    let mut orchestrator = Orchestrator::new(vectors);
    let mut params = base_params(2, Metric::Cosine);
    params.update = UpdateKind::Pam;
    let report = orchestrator.run(&params, false).unwrap();

    assert_eq!(report.clusters.iter().map(|c| c.size).sum::<usize>(), 4);
}

#[test]
fn test_config_from_file_feeds_orchestrator_run_params() {
    let config_file = write_fixture(
        "number_of_clusters = 2\nnumber_of_hash_functions = 3\nnumber_of_hash_tables = 3\nmax_algo_iterations = 10\n",
    );
    let config = Config::from_file(config_file.path()).unwrap();
    assert_eq!(config.number_of_clusters, Some(2));

    let input_file = write_fixture("header\nA,0.0,0.0\nB,0.0,1.0\nC,10.0,0.0\nD,10.0,1.0\n");
    let vectors = read_vectors(input_file.path(), ',', 1).unwrap();

    let params = RunParams {
        k: config.number_of_clusters.unwrap(),
        metric: Metric::Euclidean,
        max_iter: config.max_algo_iterations,
        min_dist_kmeans: config.min_dist_kmeans,
        init: Init::KMeansPlusPlus,
        assignment: AssignmentKind::Lsh,
        update: UpdateKind::KMeans,
        seed: 3,
        l: config.number_of_hash_tables,
        k_hash: config.number_of_hash_functions,
        bucket_div: config.lsh_bucket_div,
        euclidean_h_w: config.euclidean_h_w,
        cube_probes: config.cube_probes,
    };

    let mut orchestrator = Orchestrator::new(vectors);
    let report = orchestrator.run(&params, false).unwrap();
    assert_eq!(report.clusters.len(), 2);
}

#[test]
fn test_missing_input_file_reports_error_without_panic() {
    let result = read_vectors("/no/such/file/for/this/test.csv", ',', 1);
    assert!(result.is_err());
}
