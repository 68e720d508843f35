// src/services/settings_service.rs
use crate::{
    error::AppResult,
    models::settings::{
        AllSettings, Catalog, NotificationSettings, SchoolSettings, ThemeSettings,
        NOTIFICATION_SETTINGS_KEY, SCHOOL_SETTINGS_KEY, THEME_SETTINGS_KEY,
    },
    services::storage::{load_json, save_json, KeyValueStore},
};
use tokio::sync::Mutex;

// Serializa as escritas (ler, alterar, gravar) das definições
static WRITE_LOCK: Mutex<()> = Mutex::const_new(());

/// Carrega as definições guardadas; cada secção ausente fica com os valores de fábrica.
pub async fn load<S>(store: &S) -> AppResult<AllSettings>
where
    S: KeyValueStore + ?Sized,
{
    let school = load_json::<SchoolSettings, _>(store, SCHOOL_SETTINGS_KEY)
        .await?
        .unwrap_or_default();
    let notifications = load_json::<NotificationSettings, _>(store, NOTIFICATION_SETTINGS_KEY)
        .await?
        .unwrap_or_default();
    let theme = load_json::<ThemeSettings, _>(store, THEME_SETTINGS_KEY)
        .await?
        .unwrap_or_default();

    Ok(AllSettings {
        school,
        notifications,
        theme,
    })
}

pub async fn load_school<S>(store: &S) -> AppResult<SchoolSettings>
where
    S: KeyValueStore + ?Sized,
{
    Ok(load_json::<SchoolSettings, _>(store, SCHOOL_SETTINGS_KEY)
        .await?
        .unwrap_or_default())
}

pub async fn save<S>(store: &S, settings: &AllSettings) -> AppResult<()>
where
    S: KeyValueStore + ?Sized,
{
    let _guard = WRITE_LOCK.lock().await;
    write_all(store, settings).await
}

async fn write_all<S>(store: &S, settings: &AllSettings) -> AppResult<()>
where
    S: KeyValueStore + ?Sized,
{
    save_json(store, SCHOOL_SETTINGS_KEY, &settings.school).await?;
    save_json(store, NOTIFICATION_SETTINGS_KEY, &settings.notifications).await?;
    save_json(store, THEME_SETTINGS_KEY, &settings.theme).await?;
    tracing::info!("✅ Definições guardadas.");
    Ok(())
}

/// Repõe as notificações e o tema. Os dados da escola não são tocados.
pub async fn reset<S>(store: &S) -> AppResult<AllSettings>
where
    S: KeyValueStore + ?Sized,
{
    let _guard = WRITE_LOCK.lock().await;
    let mut settings = load(store).await?;
    settings.notifications = NotificationSettings::default();
    settings.theme = ThemeSettings::default();
    write_all(store, &settings).await?;
    tracing::info!("Definições de notificação e tema repostas.");
    Ok(settings)
}

/// Acrescenta um valor a uma lista (ano, turma ou especialização).
/// Valores vazios ou repetidos são ignorados.
pub async fn add_catalog_entry<S>(store: &S, catalog: Catalog, value: &str) -> AppResult<SchoolSettings>
where
    S: KeyValueStore + ?Sized,
{
    let _guard = WRITE_LOCK.lock().await;
    let mut school = load_school(store).await?;
    let value = value.trim();
    let entries = catalog.entries_mut(&mut school);

    if value.is_empty() || entries.iter().any(|e| e == value) {
        tracing::debug!("Valor '{}' ignorado em {:?} (vazio ou repetido)", value, catalog);
        return Ok(school);
    }

    entries.push(value.to_string());
    save_json(store, SCHOOL_SETTINGS_KEY, &school).await?;
    tracing::info!("'{}' acrescentado a {:?}", value, catalog);
    Ok(school)
}

pub async fn remove_catalog_entry<S>(store: &S, catalog: Catalog, value: &str) -> AppResult<SchoolSettings>
where
    S: KeyValueStore + ?Sized,
{
    let _guard = WRITE_LOCK.lock().await;
    let mut school = load_school(store).await?;
    let entries = catalog.entries_mut(&mut school);
    let before = entries.len();
    entries.retain(|e| e != value);

    if entries.len() != before {
        save_json(store, SCHOOL_SETTINGS_KEY, &school).await?;
        tracing::info!("'{}' removido de {:?}", value, catalog);
    }
    Ok(school)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::MemoryKvStore;

    #[tokio::test]
    async fn empty_store_yields_factory_defaults() {
        let store = MemoryKvStore::new();
        let settings = load(&store).await.unwrap();
        assert_eq!(settings, AllSettings::default());
        assert_eq!(settings.school.school_name, "مدرسة النهضة الثانوية");
        assert!(settings.notifications.absence_alerts);
        assert!(!settings.theme.dark_mode);
    }

    #[tokio::test]
    async fn save_then_load_keeps_changes() {
        let store = MemoryKvStore::new();
        let mut settings = AllSettings::default();
        settings.school.school_phone = "0550000000".to_string();
        settings.notifications.daily_reports = false;
        settings.theme.dark_mode = true;
        save(&store, &settings).await.unwrap();

        let loaded = load(&store).await.unwrap();
        assert_eq!(loaded, settings);
    }

    #[tokio::test]
    async fn legacy_school_blob_is_merged_with_default_lists() {
        let store = MemoryKvStore::new();
        store
            .set_item(
                SCHOOL_SETTINGS_KEY,
                r#"{"schoolName":"مدرسة","schoolAddress":"","schoolPhone":"","schoolEmail":""}"#,
            )
            .await
            .unwrap();
        let school = load_school(&store).await.unwrap();
        assert_eq!(school.school_name, "مدرسة");
        assert_eq!(school.sections.len(), 3);
        assert_eq!(school.specializations.len(), 2);
    }

    #[tokio::test]
    async fn reset_restores_toggles_but_keeps_school() {
        let store = MemoryKvStore::new();
        let mut settings = AllSettings::default();
        settings.school.school_name = "Outra".to_string();
        settings.notifications.email_notifications = false;
        settings.theme.high_contrast = true;
        save(&store, &settings).await.unwrap();

        let reset = reset(&store).await.unwrap();
        assert_eq!(reset.school.school_name, "Outra");
        assert_eq!(reset.notifications, NotificationSettings::default());
        assert_eq!(reset.theme, ThemeSettings::default());
    }

    #[tokio::test]
    async fn catalog_entries_skip_empty_and_duplicates() {
        let store = MemoryKvStore::new();

        let school = add_catalog_entry(&store, Catalog::Sections, "د").await.unwrap();
        assert_eq!(school.sections.last().map(String::as_str), Some("د"));

        let school = add_catalog_entry(&store, Catalog::Sections, "د").await.unwrap();
        assert_eq!(school.sections.iter().filter(|s| *s == "د").count(), 1);

        let school = add_catalog_entry(&store, Catalog::Grades, "   ").await.unwrap();
        assert_eq!(school.grades.len(), 3);

        let school = remove_catalog_entry(&store, Catalog::Specializations, "أدبي").await.unwrap();
        assert_eq!(school.specializations, vec!["علمي".to_string()]);

        // Persistido
        let reloaded = load_school(&store).await.unwrap();
        assert_eq!(reloaded.sections.len(), 4);
        assert_eq!(reloaded.specializations.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_catalog_adds_are_all_kept() {
        let pool = crate::db::create_memory_pool().await.unwrap();
        let store = std::sync::Arc::new(crate::services::storage::SqliteKvStore::new(pool));

        let values = ["د", "هـ", "و", "ز", "ح", "ط"];
        let handles: Vec<_> = values
            .iter()
            .map(|v| {
                let store = store.clone();
                let v = v.to_string();
                tokio::spawn(async move { add_catalog_entry(store.as_ref(), Catalog::Sections, &v).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let school = load_school(store.as_ref()).await.unwrap();
        assert_eq!(school.sections.len(), 3 + values.len());
        for v in values {
            assert!(school.sections.iter().any(|s| s == v), "{} em falta", v);
        }
    }
}
