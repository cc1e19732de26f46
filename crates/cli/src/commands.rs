//! Command handlers.

use anyhow::{Context, Result, bail};

use eduform_client::{
    Collection, CollectionData, EngineClient, RecommendationForm, Recommender, ReferenceDataLoader, SearchCatalog,
    SubmitOutcome, SuggestionController, SuggestionSettings,
};
use eduform_core::results::sort_for_table;
use eduform_core::{AppConfig, CacheDb, InstitutionFilter, PagedView, TimedCache};

use crate::args::{CacheCommand, Command};
use crate::output::Printer;

/// Everything a command may need; the network side is built on demand.
pub(crate) struct App {
    config: AppConfig,
    cache: TimedCache,
    printer: Printer,
}

impl App {
    pub(crate) async fn open(config: AppConfig, json: bool) -> Result<Self> {
        let db = CacheDb::open(&config.db_path)
            .await
            .with_context(|| format!("failed to open cache at {}", config.db_path.display()))?;
        let cache = TimedCache::new(db, config.cache_ttl());
        Ok(Self { config, cache, printer: Printer::new(json) })
    }

    fn loader(&self) -> Result<ReferenceDataLoader> {
        let api = EngineClient::from_config(&self.config)?;
        Ok(ReferenceDataLoader::new(api, self.cache.clone()))
    }

    pub(crate) async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Regions(refresh) => self.names(Collection::Regions, refresh.refresh).await,
            Command::Cities { region, refresh } => {
                self.names(Collection::cities_in(region.as_deref()), refresh.refresh).await
            }
            Command::FounderTypes(refresh) => self.names(Collection::FounderTypes, refresh.refresh).await,
            Command::Search { text, limit, filters, refresh } => {
                self.search(&text, limit, &filters.to_filter(None), refresh.refresh).await
            }
            Command::Table { text, filters, page, refresh } => {
                self.table(filters.to_filter(text), page, refresh.refresh).await
            }
            Command::Recommend { interests, filters, entrance_exam, page, refresh } => {
                self.recommend(&filters.to_form(&interests, entrance_exam), page, refresh.refresh).await
            }
            Command::Cache(command) => self.cache(command).await,
        }
    }

    async fn names(&self, collection: Collection, refresh: bool) -> Result<()> {
        let loader = self.loader()?;
        let data = if refresh { loader.refresh(collection).await? } else { loader.load(collection).await? };

        match data {
            CollectionData::Names(names) => self.printer.names(&names),
            CollectionData::Institutions(_) => bail!("expected a list of names"),
        }
    }

    async fn search(&self, text: &str, limit: Option<usize>, filter: &InstitutionFilter, refresh: bool) -> Result<()> {
        let catalog = SearchCatalog::new(self.loader()?).with_threshold(self.config.fuzzy_threshold);
        if refresh {
            catalog.refresh(filter).await?;
        } else {
            catalog.rebuild(filter).await?;
        }

        let mut settings = SuggestionSettings::from_app(&self.config);
        if let Some(limit) = limit {
            settings.submit_limit = limit;
        }
        let mut field = SuggestionController::new(catalog.handle(), settings);
        field.input(text);

        match field.submit() {
            SubmitOutcome::Matches(matches) => self.printer.matches(text, &matches),
            SubmitOutcome::Selected(record) => self.printer.records(std::slice::from_ref(&record)),
            SubmitOutcome::EmptyQuery => bail!("search text must not be empty"),
            SubmitOutcome::NotReady => bail!("search index is not available"),
        }
    }

    async fn table(&self, filter: InstitutionFilter, page: usize, refresh: bool) -> Result<()> {
        let loader = self.loader()?;
        let directory = if refresh {
            match loader.refresh(Collection::Institutions).await? {
                CollectionData::Institutions(records) => records,
                CollectionData::Names(_) => bail!("expected institution records"),
            }
        } else {
            loader.institutions().await?
        };

        let mut rows = directory.as_ref().clone();
        sort_for_table(&mut rows);

        let mut view = PagedView::new(self.config.table_page_size);
        view.set_filter(filter);
        view.set_page(page);
        let page = view.render(&rows);

        self.printer.table(&page)
    }

    async fn recommend(&self, form: &RecommendationForm, page: usize, refresh: bool) -> Result<()> {
        let loader = self.loader()?;
        if refresh {
            loader.refresh(Collection::Institutions).await?;
        }

        let recommender = Recommender::new(loader);
        let (_, results) = recommender.submit(form).await?;
        let page = results.page(page, self.config.grouped_page_size);

        self.printer.recommendation(&results, &page)
    }

    async fn cache(&self, command: CacheCommand) -> Result<()> {
        match command {
            CacheCommand::List => {
                let entries = self.cache.db().list_entries().await?;
                let location = self.cache.db().location().to_string();
                self.printer.cache_entries(&location, &entries, self.cache.ttl())
            }
            CacheCommand::Purge { max_entries } => {
                let mut deleted = self.cache.purge_expired().await?;
                if let Some(max) = max_entries {
                    deleted += self.cache.evict_to_capacity(max).await?;
                }
                tracing::info!(deleted, "cache purged");
                self.printer.deleted(deleted)
            }
            CacheCommand::Remove { key } => {
                let removed = self.cache.invalidate(&key).await?;
                if !removed {
                    tracing::warn!(%key, "no cache entry to remove");
                }
                self.printer.deleted(u64::from(removed))
            }
            CacheCommand::Clear => {
                let deleted = self.cache.db().clear_entries().await?;
                self.printer.deleted(deleted)
            }
        }
    }
}
