//! Runs initialization -> (assignment -> update)* until convergence or the
//! iteration cap, then evaluates silhouette and renders a report.

use crate::assignment::AssignmentStrategy;
use crate::error::Result;
use crate::hypercube::HypercubeIndex;
use crate::init;
use crate::lsh::LshEnsemble;
use crate::silhouette::{partition, silhouette};
use crate::update::{kmeans_update, pam_update};
use crate::utils::create_rng;
use crate::vector::{Metric, Vector};
use log::info;
use rand::rngs::SmallRng;
use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Init {
    Random,
    KMeansPlusPlus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentKind {
    Lloyd,
    Lsh,
    Hypercube,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    KMeans,
    Pam,
}

/// Every tunable the orchestrator needs, gathered in one place so a run is
/// reproducible from `(RunParams, seed)` alone.
pub struct RunParams {
    pub k: usize,
    pub metric: Metric,
    pub max_iter: usize,
    pub min_dist_kmeans: f64,
    pub init: Init,
    pub assignment: AssignmentKind,
    pub update: UpdateKind,
    pub seed: u64,
    pub l: usize,
    pub k_hash: usize,
    pub bucket_div: usize,
    pub euclidean_h_w: f64,
    pub cube_probes: usize,
}

pub enum CentroidRepr {
    Coordinates(Vec<f64>),
    VectorId(String),
}

pub struct ClusterReport {
    pub size: usize,
    pub centroid: CentroidRepr,
    pub members: Option<Vec<String>>,
}

pub struct Report {
    pub algorithm: String,
    pub metric: Metric,
    pub clusters: Vec<ClusterReport>,
    pub clustering_time: Duration,
    pub silhouette: Vec<f64>,
}

pub struct Orchestrator {
    input: Vec<Vector>,
}

impl Orchestrator {
    pub fn new(input: Vec<Vector>) -> Self {
        Orchestrator { input }
    }

    pub fn input(&self) -> &[Vector] {
        &self.input
    }

    pub fn run(&mut self, params: &RunParams, complete: bool) -> Result<Report> {
        let start = std::time::Instant::now();
        let mut rng = create_rng(params.seed);

        let mut centroids = match params.init {
            Init::Random => init::random_uniform(&self.input, params.k, &mut rng)?,
            Init::KMeansPlusPlus => {
                init::kmeans_pp(&self.input, params.k, params.metric, &mut rng)?
            }
        };

        let strategy = match params.assignment {
            AssignmentKind::Lloyd => AssignmentStrategy::Lloyd,
            AssignmentKind::Lsh => {
                let ensemble = LshEnsemble::build(
                    &self.input,
                    params.metric,
                    params.l,
                    params.k_hash,
                    params.bucket_div,
                    params.euclidean_h_w,
                    child_seed(&mut rng),
                )?;
                AssignmentStrategy::Lsh(ensemble)
            }
            AssignmentKind::Hypercube => {
                let cube = HypercubeIndex::build(
                    &self.input,
                    params.metric,
                    params.k_hash,
                    params.euclidean_h_w,
                    child_seed(&mut rng),
                )?;
                AssignmentStrategy::Hypercube(cube, params.cube_probes)
            }
        };

        let mut iter = 0usize;
        loop {
            strategy.assign(&mut self.input, &mut centroids, params.metric)?;
            let cont = match params.update {
                UpdateKind::KMeans => {
                    kmeans_update(&self.input, &mut centroids, params.metric, params.min_dist_kmeans)?
                }
                UpdateKind::Pam => pam_update(&self.input, &mut centroids, params.metric)?,
            };
            iter += 1;
            info!("iteration {} complete, continue = {}", iter, cont);
            if !cont || iter >= params.max_iter {
                break;
            }
        }

        let clusters = partition(&self.input, params.k);
        let sils = silhouette(&clusters, &centroids, &self.input, params.metric)?;

        let cluster_reports = clusters
            .iter()
            .enumerate()
            .map(|(i, members)| {
                let centroid_repr = match params.update {
                    UpdateKind::KMeans => CentroidRepr::Coordinates(centroids[i].dims().to_vec()),
                    UpdateKind::Pam => CentroidRepr::VectorId(centroids[i].id().to_string()),
                };
                ClusterReport {
                    size: members.len(),
                    centroid: centroid_repr,
                    members: if complete {
                        Some(
                            members
                                .iter()
                                .map(|&idx| self.input[idx as usize].id().to_string())
                                .collect(),
                        )
                    } else {
                        None
                    },
                }
            })
            .collect();

        Ok(Report {
            algorithm: algorithm_label(params),
            metric: params.metric,
            clusters: cluster_reports,
            clustering_time: start.elapsed(),
            silhouette: sils,
        })
    }
}

fn child_seed(rng: &mut SmallRng) -> u64 {
    rng.gen::<u64>().max(1)
}

fn algorithm_label(params: &RunParams) -> String {
    let i = match params.init {
        Init::Random => 1,
        Init::KMeansPlusPlus => 2,
    };
    let a = match params.assignment {
        AssignmentKind::Lloyd => 1,
        AssignmentKind::Lsh => 2,
        AssignmentKind::Hypercube => 3,
    };
    let u = match params.update {
        UpdateKind::KMeans => 1,
        UpdateKind::Pam => 2,
    };
    format!("I{}A{}U{}", i, a, u)
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Algorithm: {}", self.algorithm)?;
        writeln!(
            f,
            "Metric: {}",
            match self.metric {
                Metric::Euclidean => "euclidean",
                Metric::Cosine => "cosine",
            }
        )?;
        for (i, cluster) in self.clusters.iter().enumerate() {
            match &cluster.centroid {
                CentroidRepr::Coordinates(dims) => {
                    let coords: Vec<String> = dims.iter().map(|d| d.to_string()).collect();
                    writeln!(
                        f,
                        "CLUSTER-{} {{size: {} centroid: {}}}",
                        i + 1,
                        cluster.size,
                        coords.join(" ")
                    )?;
                }
                CentroidRepr::VectorId(id) => {
                    writeln!(
                        f,
                        "CLUSTER-{} {{size: {} centroid: {}}}",
                        i + 1,
                        cluster.size,
                        id
                    )?;
                }
            }
        }
        writeln!(f, "clustering_time: {:?}", self.clustering_time)?;
        write!(f, "Silhouette: {:?}", self.silhouette)?;
        for (i, cluster) in self.clusters.iter().enumerate() {
            if let Some(members) = &cluster.members {
                writeln!(f)?;
                write!(f, "CLUSTER-{} {{{}}}", i + 1, members.join(", "))?;
            }
        }
        Ok(())
    }
}
