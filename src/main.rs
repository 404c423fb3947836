use anyhow::Result;
use serde_json::json;

use storefront::catalog::{derive_view_refs, FilterSpec, Pager};
use storefront::config::Config;
use storefront::filters;
use storefront::logging::{log, obj, ts_epoch_ms, v_num, v_str, Domain, Level, ProfileScope};
use storefront::metrics::DashboardMetrics;
use storefront::mock;
use storefront::search::Debouncer;
use storefront::store::{KvStore, ProductRepository};

fn main() -> Result<()> {
    let cfg = Config::from_env();
    let now = ts_epoch_ms();
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("store_path", v_str(&cfg.store_path)),
            ("page_size", v_num(cfg.page_size as f64)),
        ]),
    );

    let mut store = KvStore::open(&cfg.store_path)?;
    if cfg.seed_mock_data {
        mock::seed(&mut store, &mut rand::thread_rng(), now)?;
    }

    let products = store.all_products()?;
    // Optional search term as the first argument, settled the way the search box would settle it.
    let mut search = Debouncer::new(cfg.search_debounce_ms);
    if let Some(term) = std::env::args().nth(1) {
        search.input(term, now);
    }
    let term = search.poll(now + cfg.search_debounce_ms).to_string();
    let spec = FilterSpec::default()
        .with_search(term)
        .with_price(cfg.price_min, cfg.price_max);
    let view = {
        let _p = ProfileScope::with_context("default_view", &[("products", v_num(products.len() as f64))]);
        derive_view_refs(&products, &spec)
    };
    let mut pager = Pager::new(cfg.page_size);
    pager.sync(&spec);
    let first_page: Vec<_> = pager
        .visible(view.as_slice())
        .iter()
        .map(|p| json!({ "id": p.id, "name": p.name, "price": p.price }))
        .collect();
    log(
        Level::Info,
        Domain::Catalog,
        "default_view",
        obj(&[
            ("total", v_num(view.len() as f64)),
            ("visible", v_num(first_page.len() as f64)),
            ("has_more", json!(pager.has_more(view.len()))),
            ("page", json!(first_page)),
        ]),
    );

    let active: Vec<_> = filters::active_filters(&mut store, now)?
        .into_iter()
        .map(|f| {
            let options = filters::filter_options(&f, &products).len();
            json!({ "name": f.name, "type": f.filter_type, "options": options })
        })
        .collect();
    log(Level::Info, Domain::Admin, "active_filters", obj(&[("filters", json!(active))]));

    let metrics = DashboardMetrics::from_store(&store, cfg.recent_events)?;
    log(
        Level::Info,
        Domain::Admin,
        "dashboard_metrics",
        obj(&[
            ("total_sellers", v_num(metrics.total_sellers as f64)),
            ("total_buyers", v_num(metrics.total_buyers as f64)),
            ("total_products", v_num(metrics.total_products as f64)),
            ("total_orders", v_num(metrics.total_orders as f64)),
            ("total_revenue", v_num(metrics.total_revenue)),
            ("total_events", v_num(metrics.total_events as f64)),
            ("active_sellers", v_num(metrics.active_sellers as f64)),
            ("active_buyers", v_num(metrics.active_buyers as f64)),
        ]),
    );
    Ok(())
}
