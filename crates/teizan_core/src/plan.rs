//! Deterministic build plan construction (no execution).

use crate::config::MissingElevation;
use crate::content::{BEGINNER_TOPICS, EQUIPMENT_ITEMS, STATIC_PAGES};
use crate::model::{BuildPlan, BuildTask, Mountain, Project, TaskId, TaskKind};
use crate::prefecture::{self, Region};
use crate::resolve::{PLACEHOLDER, resolve_mountain};
use crate::url::UrlMapper;
use blake3::{Hash, Hasher};
use std::collections::BTreeSet;
use std::path::PathBuf;

pub const STYLESHEET_PATH: &str = "css/style.css";
pub const SITEMAP_PATH: &str = "sitemap.xml";

const SKELETON_DIRS: &[&str] = &["css", "mountains", "regions", "equipment", "beginner"];

/// Every output of a build, in write order: stylesheet, mountain pages,
/// index pages, region and prefecture pages, equipment, beginner guide,
/// static pages, then the sitemap.
pub fn build_plan(project: &Project) -> BuildPlan {
    let config_hash = hash_config(project);
    let mapper = UrlMapper::new(&project.config);
    let mut tasks = Vec::new();

    let mut push = |kind: TaskKind, inputs: &[Hash], output: PathBuf| {
        let id = task_id(&kind, inputs, config_hash);
        tasks.push(BuildTask {
            id,
            kind,
            outputs: vec![output],
        });
    };

    push(
        TaskKind::WriteStylesheet,
        &[],
        PathBuf::from(STYLESHEET_PATH),
    );

    let keys = mapper.assign_mountain_keys(&project.mountains);
    let mountain_hashes: Vec<Hash> = project.mountains.iter().map(hash_mountain).collect();
    for ((mountain, key), hash) in project.mountains.iter().zip(&keys).zip(&mountain_hashes) {
        push(
            TaskKind::RenderMountain {
                mountain_id: mountain.id.clone(),
            },
            &[*hash],
            mapper.map(key).primary_output,
        );
    }

    let mut all_hashes = mountain_hashes.clone();
    all_hashes.sort_by_key(|hash| *hash.as_bytes());
    push(
        TaskKind::RenderIndex,
        &all_hashes,
        mapper.map("index").primary_output,
    );
    push(
        TaskKind::RenderMountainList,
        &all_hashes,
        mapper.map("mountains").primary_output,
    );
    push(
        TaskKind::RenderRegionsOverview,
        &all_hashes,
        mapper.map("regions").primary_output,
    );

    let listed = listed_mountains(project);
    let mut regions = Region::KNOWN.to_vec();
    if project
        .mountains
        .iter()
        .any(|mountain| resolve_mountain(mountain).region == Region::Other)
    {
        regions.push(Region::Other);
    }
    for region in regions {
        push(
            TaskKind::RenderRegion {
                region: region.slug().to_string(),
            },
            &all_hashes,
            mapper.map(&mapper.region_key(region)).primary_output,
        );
    }

    for prefecture in listed_prefectures(&listed) {
        push(
            TaskKind::RenderPrefecture {
                prefecture: prefecture.clone(),
            },
            &all_hashes,
            mapper.map(&mapper.prefecture_key(&prefecture)).primary_output,
        );
    }

    push(
        TaskKind::RenderEquipmentIndex,
        &[],
        mapper.map("equipment").primary_output,
    );
    for item in EQUIPMENT_ITEMS {
        push(
            TaskKind::RenderEquipmentItem {
                item: item.slug.to_string(),
            },
            &[blake3::hash(item.markdown.as_bytes())],
            mapper.map(&format!("equipment/{}", item.slug)).primary_output,
        );
    }

    push(
        TaskKind::RenderBeginnerIndex,
        &all_hashes,
        mapper.map("beginner").primary_output,
    );
    for topic in BEGINNER_TOPICS {
        push(
            TaskKind::RenderBeginnerTopic {
                topic: topic.slug.to_string(),
            },
            &[blake3::hash(topic.markdown.as_bytes())],
            mapper.map(&format!("beginner/{}", topic.slug)).primary_output,
        );
    }

    for page in STATIC_PAGES {
        push(
            TaskKind::RenderStaticPage {
                page: page.slug.to_string(),
            },
            &[blake3::hash(page.markdown.as_bytes())],
            mapper.map(page.slug).primary_output,
        );
    }

    push(
        TaskKind::GenerateSitemap,
        &all_hashes,
        PathBuf::from(SITEMAP_PATH),
    );

    let dirs = SKELETON_DIRS.iter().map(PathBuf::from).collect();
    BuildPlan { tasks, dirs }
}

fn listed_mountains(project: &Project) -> Vec<&Mountain> {
    let skip_missing = project.config.build.missing_elevation == MissingElevation::Skip;
    project
        .mountains
        .iter()
        .filter(|mountain| !(skip_missing && mountain.elevation.is_none()))
        .collect()
}

fn listed_prefectures(listed: &[&Mountain]) -> Vec<String> {
    let names: BTreeSet<(usize, String)> = listed
        .iter()
        .map(|mountain| resolve_mountain(mountain).prefecture)
        .filter(|name| name != PLACEHOLDER)
        .map(|name| (prefecture::sort_key(&name), name))
        .collect();
    names.into_iter().map(|(_, name)| name).collect()
}

pub fn task_id(kind: &TaskKind, input_hashes: &[Hash], config_hash: Hash) -> TaskId {
    let mut hasher = Hasher::new();
    add_str(&mut hasher, kind_key(kind));
    add_kind_fields(&mut hasher, kind);
    add_hashes(&mut hasher, input_hashes);
    add_hash(&mut hasher, &config_hash);
    hasher.finalize()
}

fn hash_config(project: &Project) -> Hash {
    let encoded = serde_json::to_vec(&project.config).unwrap_or_default();
    blake3::hash(&encoded)
}

fn hash_mountain(mountain: &Mountain) -> Hash {
    let encoded = serde_json::to_vec(mountain).unwrap_or_default();
    blake3::hash(&encoded)
}

fn kind_key(kind: &TaskKind) -> &'static str {
    match kind {
        TaskKind::WriteStylesheet => "WriteStylesheet",
        TaskKind::RenderMountain { .. } => "RenderMountain",
        TaskKind::RenderIndex => "RenderIndex",
        TaskKind::RenderMountainList => "RenderMountainList",
        TaskKind::RenderRegionsOverview => "RenderRegionsOverview",
        TaskKind::RenderRegion { .. } => "RenderRegion",
        TaskKind::RenderPrefecture { .. } => "RenderPrefecture",
        TaskKind::RenderEquipmentIndex => "RenderEquipmentIndex",
        TaskKind::RenderEquipmentItem { .. } => "RenderEquipmentItem",
        TaskKind::RenderBeginnerIndex => "RenderBeginnerIndex",
        TaskKind::RenderBeginnerTopic { .. } => "RenderBeginnerTopic",
        TaskKind::RenderStaticPage { .. } => "RenderStaticPage",
        TaskKind::GenerateSitemap => "GenerateSitemap",
    }
}

fn add_kind_fields(hasher: &mut Hasher, kind: &TaskKind) {
    match kind {
        TaskKind::RenderMountain { mountain_id } => add_str(hasher, mountain_id),
        TaskKind::RenderRegion { region } => add_str(hasher, region),
        TaskKind::RenderPrefecture { prefecture } => add_str(hasher, prefecture),
        TaskKind::RenderEquipmentItem { item } => add_str(hasher, item),
        TaskKind::RenderBeginnerTopic { topic } => add_str(hasher, topic),
        TaskKind::RenderStaticPage { page } => add_str(hasher, page),
        TaskKind::WriteStylesheet
        | TaskKind::RenderIndex
        | TaskKind::RenderMountainList
        | TaskKind::RenderRegionsOverview
        | TaskKind::RenderEquipmentIndex
        | TaskKind::RenderBeginnerIndex
        | TaskKind::GenerateSitemap => {}
    }
}

fn add_hashes(hasher: &mut Hasher, hashes: &[Hash]) {
    add_u64(hasher, hashes.len() as u64);
    for hash in hashes {
        add_hash(hasher, hash);
    }
}

fn add_hash(hasher: &mut Hasher, hash: &Hash) {
    hasher.update(hash.as_bytes());
}

fn add_str(hasher: &mut Hasher, value: &str) {
    add_u64(hasher, value.len() as u64);
    hasher.update(value.as_bytes());
}

fn add_u64(hasher: &mut Hasher, value: u64) {
    hasher.update(&value.to_le_bytes());
}
