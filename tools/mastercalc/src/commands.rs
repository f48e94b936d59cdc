//! Persistence and navigation commands

use anyhow::{bail, Result};
use clap::Subcommand;
use colored::*;
use mastercalc_calc::{CalculatorId, Screen};
use mastercalc_store::{
    DraftAutosave, SlotStatus, StoreKey, Theme, DEFAULT_TEMPLATE_DATA, DEFAULT_TEMPLATE_DESCRIPTION,
};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::context::AppContext;

#[derive(Debug, Clone, Subcommand)]
pub enum HistoryCommand {
    /// Show recent calculations, newest first
    List,
    /// Delete one entry by id
    Delete { id: i64 },
    /// Delete all entries
    Clear,
}

#[derive(Debug, Clone, Subcommand)]
pub enum FavoritesCommand {
    /// Show favorite calculators
    List,
    /// Add a calculator by id (e.g. ohm, cable-section)
    Add { calculator: String },
    /// Remove the favorite at a list position (0-based)
    Remove { index: usize },
    /// Add the calculator if absent, remove it otherwise
    Toggle { calculator: String },
}

#[derive(Debug, Clone, Subcommand)]
pub enum TemplatesCommand {
    /// Show saved templates
    List,
    /// Save a template under a name
    Save {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        data: Option<String>,
    },
    /// Load the template at a list position (0-based)
    Show { index: usize },
    /// Delete the template at a list position (0-based)
    Delete { index: usize },
    /// Delete all templates
    Clear,
}

#[derive(Debug, Clone, Subcommand)]
pub enum DraftCommand {
    /// Print the saved draft
    Show,
    /// Replace the draft text; quote it to keep spacing, use `edit` for
    /// multi-line text
    Save { text: String },
    /// Delete the draft
    Clear,
    /// Type a draft on stdin; autosaved periodically, saved on EOF
    Edit,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ThemeCommand {
    Show,
    /// light or dark
    Set { theme: String },
    Toggle,
}

fn calculator_arg(raw: &str) -> Result<CalculatorId> {
    Ok(raw.parse::<CalculatorId>()?)
}

pub async fn history(ctx: &mut AppContext, cmd: HistoryCommand) -> Result<()> {
    ctx.state.open(Screen::History);
    match cmd {
        HistoryCommand::List => {
            let entries = ctx.store.history().await?;
            if ctx.output.is_json() {
                return ctx.output.json(&entries);
            }
            ctx.output.heading("История расчетов");
            if entries.is_empty() {
                ctx.output.empty("История пуста");
            }
            for entry in &entries {
                println!(
                    "{:>14}  {}  {}",
                    entry.id.to_string().dimmed(),
                    entry.timestamp,
                    entry.name.bold()
                );
                println!("{:>16}{}", "", entry.result);
            }
        },
        HistoryCommand::Delete { id } => {
            if !ctx.store.delete_history(id).await? {
                bail!("История: запись {} не найдена", id);
            }
            ctx.output.success("Запись удалена");
        },
        HistoryCommand::Clear => {
            ctx.store.clear_history().await?;
            ctx.output.success("История очищена");
        },
    }
    Ok(())
}

pub async fn favorites(ctx: &mut AppContext, cmd: FavoritesCommand) -> Result<()> {
    ctx.state.open(Screen::Favorites);
    match cmd {
        FavoritesCommand::List => {
            let favorites = ctx.store.favorites().await?;
            if ctx.output.is_json() {
                return ctx.output.json(&favorites);
            }
            ctx.output.heading("Избранное");
            if favorites.is_empty() {
                ctx.output.empty("Нет избранных калькуляторов");
            }
            for (index, favorite) in favorites.iter().enumerate() {
                println!(
                    "{:>3}  {:<16} {}  {}",
                    index,
                    favorite.id,
                    favorite.name.bold(),
                    favorite.description.dimmed()
                );
            }
        },
        FavoritesCommand::Add { calculator } => {
            let calculator = calculator_arg(&calculator)?;
            if ctx.store.add_calculator_favorite(calculator).await? {
                ctx.output.success(&format!("{} добавлен в избранное", calculator.title()));
            } else {
                ctx.output.warn("Уже в избранном");
            }
        },
        FavoritesCommand::Remove { index } => {
            let removed = ctx.store.remove_favorite_at(index).await?;
            ctx.output.success(&format!("{} удален из избранного", removed.name));
        },
        FavoritesCommand::Toggle { calculator } => {
            let calculator = calculator_arg(&calculator)?;
            let added = ctx.store.toggle_favorite(calculator).await?;
            let text = if added {
                "добавлен в избранное"
            } else {
                "удален из избранного"
            };
            ctx.output.success(&format!("{} {}", calculator.title(), text));
        },
    }
    Ok(())
}

pub async fn templates(ctx: &mut AppContext, cmd: TemplatesCommand) -> Result<()> {
    ctx.state.open(Screen::Templates);
    match cmd {
        TemplatesCommand::List => {
            let templates = ctx.store.templates().await?;
            if ctx.output.is_json() {
                return ctx.output.json(&templates);
            }
            ctx.output.heading("Шаблоны");
            if templates.is_empty() {
                ctx.output.empty("Нет сохраненных шаблонов");
            }
            for (index, template) in templates.iter().enumerate() {
                println!(
                    "{:>3}  {}  {}",
                    index,
                    template.name.bold(),
                    template.description.dimmed()
                );
            }
        },
        TemplatesCommand::Save {
            name,
            description,
            data,
        } => {
            let entry = match (description, data) {
                (None, None) => ctx.store.save_template(&name).await?,
                (description, data) => {
                    ctx.store
                        .save_template_with(
                            &name,
                            description
                                .as_deref()
                                .unwrap_or(DEFAULT_TEMPLATE_DESCRIPTION),
                            data.as_deref().unwrap_or(DEFAULT_TEMPLATE_DATA),
                        )
                        .await?
                },
            };
            if ctx.output.is_json() {
                return ctx.output.json(&entry);
            }
            ctx.output.success(&format!("Шаблон \"{}\" сохранен", entry.name));
        },
        TemplatesCommand::Show { index } => {
            let template = ctx.store.template(index).await?;
            if ctx.output.is_json() {
                return ctx.output.json(&template);
            }
            ctx.output.heading(&template.name);
            ctx.output.info(&template.description);
            ctx.output.info(&template.data);
            ctx.output.info(&template.timestamp.dimmed().to_string());
        },
        TemplatesCommand::Delete { index } => {
            let removed = ctx.store.delete_template(index).await?;
            ctx.output.success(&format!("Шаблон \"{}\" удален", removed.name));
        },
        TemplatesCommand::Clear => {
            ctx.store.clear_templates().await?;
            ctx.output.success("Все шаблоны удалены");
        },
    }
    Ok(())
}

pub async fn draft(ctx: &mut AppContext, cmd: DraftCommand) -> Result<()> {
    ctx.state.open(Screen::Draft);
    match cmd {
        DraftCommand::Show => {
            let text = ctx.store.draft().await?;
            if ctx.output.is_json() {
                return ctx.output.json(&json!({ "draft": text }));
            }
            if text.is_empty() {
                ctx.output.empty("Черновик пуст");
            } else {
                println!("{}", text);
            }
        },
        DraftCommand::Save { text } => {
            ctx.store.save_draft(&text).await?;
            ctx.output.success("Черновик сохранен");
        },
        DraftCommand::Clear => {
            ctx.store.clear_draft().await?;
            ctx.output.success("Черновик очищен");
        },
        DraftCommand::Edit => edit_draft(ctx).await?,
    }
    Ok(())
}

/// Stdin-driven editor: the buffer starts from the saved draft, every line is
/// appended and the autosave task picks up the latest text on each tick
async fn edit_draft(ctx: &AppContext) -> Result<()> {
    let mut text = ctx.store.draft().await?;
    let period = ctx.config.autosave_interval();
    ctx.output.info(&format!(
        "Ввод черновика, автосохранение каждые {} с. Завершение: Ctrl-D",
        period.as_secs()
    ));

    let autosave = DraftAutosave::start(ctx.store.clone(), period, text.clone());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&line);
        autosave.update(text.clone());
    }
    autosave.shutdown().await;

    if text.trim().is_empty() {
        ctx.output.warn("Черновик пуст, ничего не сохранено");
        return Ok(());
    }
    ctx.store.save_draft(&text).await?;
    debug!(len = text.len(), "Draft saved on EOF");
    ctx.output.success("Черновик сохранен");
    Ok(())
}

pub async fn theme(ctx: &AppContext, cmd: ThemeCommand) -> Result<()> {
    let theme = match cmd {
        ThemeCommand::Show => ctx.store.theme().await?,
        ThemeCommand::Set { theme } => {
            let theme = theme.parse::<Theme>()?;
            ctx.store.set_theme(theme).await?;
            theme
        },
        ThemeCommand::Toggle => ctx.store.toggle_theme().await?,
    };
    if ctx.output.is_json() {
        return ctx.output.json(&json!({ "theme": theme }));
    }
    ctx.output.info(&format!("Тема: {}", theme));
    Ok(())
}

pub async fn stats(ctx: &AppContext) -> Result<()> {
    let stats = ctx.store.stats().await?;
    if ctx.output.is_json() {
        return ctx.output.json(&stats);
    }
    ctx.output.heading("Статистика");
    ctx.output.info(&format!("Запусков: {}", stats.launch_count));
    if let Some(first) = &stats.first_launch {
        ctx.output.info(&format!("Первый запуск: {}", first));
    }
    if let Some(last) = &stats.last_launch {
        ctx.output.info(&format!("Последний запуск: {}", last));
    }
    Ok(())
}

/// Report the state of every persisted slot; fails when any is corrupt
pub async fn storage(ctx: &AppContext) -> Result<()> {
    let mut report = Vec::with_capacity(StoreKey::ALL.len());
    let mut corrupt = 0;
    for key in StoreKey::ALL {
        let status = ctx.store.inspect(key).await?;
        if matches!(status, SlotStatus::Recovered { .. }) {
            corrupt += 1;
        }
        report.push((key, status));
    }

    if ctx.output.is_json() {
        let slots: Vec<_> = report
            .iter()
            .map(|(key, status)| match status {
                SlotStatus::Missing => json!({ "key": key.key(), "status": "missing" }),
                SlotStatus::Present { version } => {
                    json!({ "key": key.key(), "status": "ok", "version": version })
                },
                SlotStatus::Recovered { reason } => {
                    json!({ "key": key.key(), "status": "corrupt", "reason": reason })
                },
            })
            .collect();
        ctx.output.json(&json!({
            "backend": ctx.store.backend().name(),
            "slots": slots,
        }))?;
    } else {
        ctx.output.heading(&format!("Хранилище ({})", ctx.store.backend().name()));
        for (key, status) in &report {
            let state = match status {
                SlotStatus::Missing => "missing".dimmed().to_string(),
                SlotStatus::Present { version } => format!("{} v{}", "ok".green(), version),
                SlotStatus::Recovered { reason } => format!("{} {}", "corrupt".red(), reason),
            };
            println!("  {:<24} {}", key.key(), state);
        }
    }

    if corrupt > 0 {
        bail!("Хранилище: повреждено слотов: {}", corrupt);
    }
    info!("Storage check passed");
    Ok(())
}

pub fn config(ctx: &AppContext) -> Result<()> {
    if ctx.output.is_json() {
        return ctx.output.json(&ctx.config);
    }
    print!("{}", ctx.config.to_toml()?);
    Ok(())
}

/// Main menu: screens with their calculators, favorites marked
pub async fn menu(ctx: &mut AppContext) -> Result<()> {
    ctx.state.escape();
    let favorites = ctx.store.favorites().await?;
    let is_favorite = |id: CalculatorId| favorites.iter().any(|f| f.id == id.id());

    if ctx.output.is_json() {
        let screens: Vec<_> = Screen::ALL
            .iter()
            .map(|screen| {
                let calculators: Vec<_> = CalculatorId::ALL
                    .iter()
                    .filter(|c| c.screen() == *screen)
                    .map(|c| {
                        json!({
                            "id": c.id(),
                            "title": c.title(),
                            "favorite": is_favorite(*c),
                        })
                    })
                    .collect();
                json!({ "id": screen.id(), "title": screen.title(), "calculators": calculators })
            })
            .collect();
        return ctx.output.json(&screens);
    }

    ctx.output.heading(&ctx.state.title());
    for screen in Screen::ALL.iter().filter(|s| **s != Screen::Menu) {
        println!("{} {}", screen.title().bold(), format!("[{}]", screen.id()).dimmed());
        for calculator in CalculatorId::ALL.iter().filter(|c| c.screen() == *screen) {
            let star = if is_favorite(*calculator) { "★" } else { " " };
            println!(
                "  {} {:<16} {}",
                star.yellow(),
                calculator.id(),
                calculator.description().dimmed()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::output::Output;
    use common::{AppConfig, StorageBackend};
    use mastercalc_calc::calculators::{power, resistor, ResistorInput};
    use mastercalc_calc::tables::BandColor;

    async fn context() -> AppContext {
        let mut config = AppConfig::default();
        config.storage.backend = StorageBackend::Memory;
        AppContext::open(config, Output::new(true)).await.unwrap()
    }

    #[tokio::test]
    async fn test_history_delete_and_clear() {
        let mut ctx = context().await;
        ctx.store.record_calculation(|| power(220.0, 5.0)).await.unwrap();
        ctx.store
            .record_calculation(|| {
                resistor(ResistorInput::from_colors(
                    BandColor::Brown,
                    BandColor::Black,
                    BandColor::Red,
                    BandColor::Gold,
                )?)
            })
            .await
            .unwrap();

        let id = ctx.store.history().await.unwrap()[0].id;
        history(&mut ctx, HistoryCommand::Delete { id }).await.unwrap();
        assert_eq!(ctx.store.history().await.unwrap().len(), 1);
        assert_eq!(ctx.state.current(), Screen::History);

        assert!(history(&mut ctx, HistoryCommand::Delete { id }).await.is_err());

        history(&mut ctx, HistoryCommand::Clear).await.unwrap();
        assert!(ctx.store.history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_favorites_commands() {
        let mut ctx = context().await;
        favorites(
            &mut ctx,
            FavoritesCommand::Add {
                calculator: "cable-section".to_string(),
            },
        )
        .await
        .unwrap();
        favorites(
            &mut ctx,
            FavoritesCommand::Toggle {
                calculator: "ohm".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(ctx.store.favorites().await.unwrap().len(), 2);

        favorites(&mut ctx, FavoritesCommand::Remove { index: 0 })
            .await
            .unwrap();
        let left = ctx.store.favorites().await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, "ohm");

        let err = favorites(&mut ctx, FavoritesCommand::Remove { index: 5 })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("out of range"));

        assert!(favorites(
            &mut ctx,
            FavoritesCommand::Add {
                calculator: "teleport".to_string(),
            },
        )
        .await
        .is_err());
    }

    #[tokio::test]
    async fn test_templates_commands() {
        let mut ctx = context().await;
        templates(
            &mut ctx,
            TemplatesCommand::Save {
                name: "  Щит 1  ".to_string(),
                description: None,
                data: Some("3×16 А".to_string()),
            },
        )
        .await
        .unwrap();

        let saved = ctx.store.template(0).await.unwrap();
        assert_eq!(saved.name, "Щит 1");
        assert_eq!(saved.description, DEFAULT_TEMPLATE_DESCRIPTION);
        assert_eq!(saved.data, "3×16 А");

        assert!(templates(
            &mut ctx,
            TemplatesCommand::Save {
                name: "   ".to_string(),
                description: None,
                data: None,
            },
        )
        .await
        .is_err());

        templates(&mut ctx, TemplatesCommand::Delete { index: 0 })
            .await
            .unwrap();
        assert!(ctx.store.templates().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_draft_and_theme() {
        let mut ctx = context().await;
        draft(
            &mut ctx,
            DraftCommand::Save {
                text: "замер  щита\nфаза A".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(ctx.store.draft().await.unwrap(), "замер  щита\nфаза A");

        draft(&mut ctx, DraftCommand::Clear).await.unwrap();
        assert_eq!(ctx.store.draft().await.unwrap(), "");

        theme(&ctx, ThemeCommand::Toggle).await.unwrap();
        assert_eq!(ctx.store.theme().await.unwrap(), Theme::Light);
        theme(
            &ctx,
            ThemeCommand::Set {
                theme: "dark".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(ctx.store.theme().await.unwrap(), Theme::Dark);
        assert!(theme(
            &ctx,
            ThemeCommand::Set {
                theme: "neon".to_string(),
            },
        )
        .await
        .is_err());
    }

    #[tokio::test]
    async fn test_storage_check_flags_corruption() {
        use mastercalc_store::KvStore;

        let mut ctx = context().await;
        storage(&ctx).await.unwrap();

        ctx.store
            .backend()
            .set(StoreKey::History.key(), "{not json")
            .await
            .unwrap();
        assert!(storage(&ctx).await.is_err());

        menu(&mut ctx).await.unwrap();
        assert_eq!(ctx.state.current(), Screen::Menu);
    }
}
