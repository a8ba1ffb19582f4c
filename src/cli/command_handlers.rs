//! Query-run flow: build the descriptor from form input, submit it, place
//! panels, follow embedded queries, render and export.

use std::path::PathBuf;
use std::sync::Arc;

use crate::api::client::NeuprintClient;
use crate::core::panels::PanelStore;
use crate::core::query::QueryDescriptor;
use crate::core::registry::{FormInput, PluginRegistry};
use crate::core::results::CellAction;
use crate::core::services::submission::{Submission, SubmissionService};
use crate::core::state::{AppState, StateEvent};
use crate::display::sort::SortDirection;
use crate::display::{TableDisplay, write_csv};
use crate::error::{AppError, CliError};
use crate::storage::credentials::Credentials;
use crate::utils::logging::VerboseLogger;
use crate::utils::validation::{parse_cell_coordinate, parse_key_value};

pub struct QueryRunArgs {
    pub slug: String,
    pub dataset: Option<String>,
    pub param: Vec<String>,
    pub rois: Option<String>,
    pub sort: Option<usize>,
    pub desc: bool,
    pub page: usize,
    pub page_size: Option<usize>,
    pub csv: Option<PathBuf>,
    pub follow: Vec<String>,
}

pub async fn run_query(
    registry: &PluginRegistry,
    client: NeuprintClient,
    profile_name: &str,
    default_data_set: Option<String>,
    logger: &VerboseLogger,
    args: QueryRunArgs,
) -> crate::Result<()> {
    let plugin = registry
        .lookup(&args.slug)
        .ok_or_else(|| CliError::UnknownPlugin {
            slug: args.slug.clone(),
            available: registry.slugs(),
        })?;

    let data_set = args
        .dataset
        .or(default_data_set)
        .ok_or_else(|| {
            CliError::InvalidArguments(
                "no dataset given; pass --dataset or set one on the profile".to_string(),
            )
        })?;

    let mut form = FormInput::new(data_set);
    if let Some(rois) = &args.rois {
        form = form.with_rois(
            rois.split(',')
                .map(str::trim)
                .filter(|roi| !roi.is_empty())
                .map(str::to_string)
                .collect(),
        );
    }
    for raw in &args.param {
        let (key, value) = parse_key_value(raw)?;
        form = form.with_param(key, value);
    }

    let descriptor = plugin.build_query(&form)?;
    logger.log(&format!("Submitting query: {}", descriptor.cypher));

    let state = Arc::new(AppState::new());

    // Re-authentication side effect: drop the stored credential as soon as
    // the server rejects it.
    let stale_profile = profile_name.to_string();
    state.subscribe(Box::new(move |event| {
        if matches!(event, StateEvent::ReauthRequired) {
            let _ = Credentials::clear_token_for_profile(&stale_profile);
            crate::utils::logging::log_warning("User must re-authenticate");
        }
    }));

    let service = SubmissionService::new(client, Arc::clone(&state));
    let mut store = PanelStore::new();

    let root_index = submit_into_store(&service, &mut store, descriptor).await?;

    // Chained submissions are independent of each other: resolve the
    // addressed cells first, then run the follow-up queries concurrently.
    let mut children = Vec::new();
    for raw in &args.follow {
        let (row, column) = parse_cell_coordinate(raw)?;
        logger.log(&format!("Following cell {}:{}", row, column));
        children.push(follow_up_descriptor(&store, root_index, row, column)?);
    }
    let submissions = futures::future::join_all(
        children.into_iter().map(|child| service.submit(child)),
    )
    .await;
    for submission in submissions {
        if let Submission::Resolved(outcome) = submission? {
            let index = store.append(outcome.tables, outcome.source_query);
            state.emit(StateEvent::PanelAppended { index });
        }
    }

    let sort = args
        .sort
        .map(|column| {
            (
                column,
                if args.desc {
                    SortDirection::Descending
                } else {
                    SortDirection::Ascending
                },
            )
        });

    let display = TableDisplay::new();
    for panel in store.list() {
        println!("[{}] {}", panel.index, panel.title());
        for table in &panel.tables {
            // Sorting applies where the column exists; narrower follow-up
            // tables render in processor order.
            let table_sort = sort.filter(|(column, _)| *column < table.column_count());
            println!("{}", display.render_table(table, table_sort, args.page, args.page_size)?);
        }
        if logger.is_enabled() {
            println!(
                "Query (submitted {}): {}",
                panel.submitted_at.to_rfc3339(),
                panel.source_query
            );
        }
        println!();
    }

    if let Some(path) = &args.csv {
        let tables: Vec<_> = store
            .list()
            .flat_map(|panel| panel.tables.iter().cloned())
            .collect();
        write_csv(&tables, path)?;
        println!("Exported {} table(s) to {}", tables.len(), path.display());
    }

    Ok(())
}

async fn submit_into_store(
    service: &SubmissionService<NeuprintClient>,
    store: &mut PanelStore,
    descriptor: QueryDescriptor,
) -> crate::Result<u64> {
    match service.submit(descriptor).await? {
        Submission::Resolved(outcome) => {
            let index = store.append(outcome.tables, outcome.source_query);
            service
                .state()
                .emit(StateEvent::PanelAppended { index });
            Ok(index)
        }
        Submission::Stale => Err(CliError::InvalidArguments(
            "query was superseded before its response arrived".to_string(),
        )
        .into()),
    }
}

/// Extract the follow-up descriptor embedded at row:column of the panel's
/// first table.
fn follow_up_descriptor(
    store: &PanelStore,
    panel_index: u64,
    row: usize,
    column: usize,
) -> crate::Result<QueryDescriptor> {
    let panel = store
        .get(panel_index)
        .ok_or_else(|| CliError::InvalidArguments("result panel is gone".to_string()))?;
    let cell = panel
        .tables
        .first()
        .and_then(|table| table.body().get(row))
        .and_then(|cells| cells.get(column))
        .ok_or_else(|| {
            CliError::InvalidArguments(format!("no cell at {}:{}", row, column))
        })?;

    match cell.action() {
        Some(CellAction::FollowUp(descriptor)) => Ok((**descriptor).clone()),
        None => Err(AppError::Cli(CliError::NotActionable { row, column })),
    }
}
