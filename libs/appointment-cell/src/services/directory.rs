use std::collections::{HashMap, HashSet};

use anyhow::Result;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::profile::{Profile, UNKNOWN_CLIENT};

use crate::models::{Appointment, AppointmentStatus, AppointmentView};

/// Read-model aggregator for the therapist portal: joins appointments with
/// client profiles and session-note coverage.
///
/// The remote store offers no server-side join here, so foreign ids from
/// the primary query are collected into single `in.(...)` batch lookups:
/// one round trip per secondary table instead of one per record.
pub struct AppointmentDirectoryService {
    supabase: SupabaseClient,
}

impl AppointmentDirectoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// All appointments for a therapist, newest first, with client names,
    /// avatars, and note coverage merged in.
    pub async fn list_for_therapist(
        &self,
        therapist_id: &str,
        auth_token: &str,
    ) -> Result<Vec<AppointmentView>> {
        let path = format!(
            "/rest/v1/appointments?therapist_id=eq.{}&order=start_time.desc",
            therapist_id
        );
        let appointments = self.fetch_appointments(&path, auth_token).await?;
        self.build_views(appointments, auth_token).await
    }

    /// Completed appointments that have no session note yet: the
    /// therapist's documentation backlog.
    pub async fn list_needing_notes(
        &self,
        therapist_id: &str,
        auth_token: &str,
    ) -> Result<Vec<AppointmentView>> {
        let path = format!(
            "/rest/v1/appointments?therapist_id=eq.{}&status=eq.{}&order=start_time.desc",
            therapist_id,
            AppointmentStatus::Completed
        );
        let appointments = self.fetch_appointments(&path, auth_token).await?;
        let views = self.build_views(appointments, auth_token).await?;

        Ok(views.into_iter().filter(|v| !v.has_note).collect())
    }

    /// Primary query: a failure here aborts the whole aggregation.
    async fn fetch_appointments(&self, path: &str, auth_token: &str) -> Result<Vec<Appointment>> {
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, path, Some(auth_token), None)
            .await?;

        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(anyhow::Error::from))
            .collect()
    }

    /// Secondary lookups + merge. Either secondary lookup failing degrades
    /// that column to its defaults; the view list itself always comes back.
    async fn build_views(
        &self,
        appointments: Vec<Appointment>,
        auth_token: &str,
    ) -> Result<Vec<AppointmentView>> {
        if appointments.is_empty() {
            return Ok(Vec::new());
        }

        let client_ids: Vec<Uuid> = {
            let mut seen = HashSet::new();
            appointments
                .iter()
                .map(|a| a.client_id)
                .filter(|id| seen.insert(*id))
                .collect()
        };
        let appointment_ids: Vec<Uuid> = appointments.iter().map(|a| a.id).collect();

        // The two secondary tables are independent; fetch them concurrently.
        let (profiles, noted) = tokio::join!(
            self.fetch_profiles(&client_ids, auth_token),
            self.fetch_noted_appointments(&appointment_ids, auth_token),
        );

        let profiles = profiles.unwrap_or_else(|e| {
            warn!("Profile lookup failed, degrading to placeholders: {}", e);
            HashMap::new()
        });
        let noted = noted.unwrap_or_else(|e| {
            warn!("Session note lookup failed, degrading to uncovered: {}", e);
            HashSet::new()
        });

        Ok(merge_views(appointments, &profiles, &noted))
    }

    async fn fetch_profiles(
        &self,
        client_ids: &[Uuid],
        auth_token: &str,
    ) -> Result<HashMap<Uuid, Profile>> {
        let path = format!(
            "/rest/v1/profiles?id={}",
            SupabaseClient::in_filter(client_ids)
        );
        let rows: Vec<Profile> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        debug!("Fetched {} client profiles for join", rows.len());
        Ok(rows.into_iter().map(|p| (p.id, p)).collect())
    }

    async fn fetch_noted_appointments(
        &self,
        appointment_ids: &[Uuid],
        auth_token: &str,
    ) -> Result<HashSet<Uuid>> {
        let path = format!(
            "/rest/v1/session_notes?appointment_id={}&select=appointment_id",
            SupabaseClient::in_filter(appointment_ids)
        );
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(rows
            .iter()
            .filter_map(|row| row["appointment_id"].as_str())
            .filter_map(|id| Uuid::parse_str(id).ok())
            .collect())
    }
}

/// Merge secondary results into the primary list, preserving the primary
/// query's order. A profile miss falls back to the documented placeholders.
fn merge_views(
    appointments: Vec<Appointment>,
    profiles: &HashMap<Uuid, Profile>,
    noted: &HashSet<Uuid>,
) -> Vec<AppointmentView> {
    appointments
        .into_iter()
        .map(|appointment| {
            let (client_name, client_image_url) = match profiles.get(&appointment.client_id) {
                Some(profile) => (profile.display_name(), profile.image_url()),
                None => (UNKNOWN_CLIENT.to_string(), String::new()),
            };
            let has_note = noted.contains(&appointment.id);

            AppointmentView {
                appointment,
                client_name,
                client_image_url,
                has_note,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn appointment(id: Uuid, client_id: Uuid, day: u32) -> Appointment {
        Appointment {
            id,
            client_id,
            therapist_id: Uuid::new_v4(),
            start_time: Utc.with_ymd_and_hms(2025, 5, day, 9, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2025, 5, day, 10, 0, 0).unwrap(),
            status: AppointmentStatus::Completed,
            session_type: "video".to_string(),
            notes: None,
            created_at: Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap(),
        }
    }

    fn profile(id: Uuid, name: &str) -> Profile {
        Profile {
            id,
            full_name: Some(name.to_string()),
            email: None,
            profile_image_url: Some(format!("https://cdn.example.com/{}.jpg", id)),
            role: Some("client".to_string()),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn merge_preserves_primary_order() {
        let c1 = Uuid::new_v4();
        let c2 = Uuid::new_v4();
        let a1 = appointment(Uuid::new_v4(), c1, 3);
        let a2 = appointment(Uuid::new_v4(), c2, 2);
        let a3 = appointment(Uuid::new_v4(), c1, 1);

        // Profile map order is irrelevant; output must follow the input list.
        let profiles: HashMap<Uuid, Profile> =
            [(c2, profile(c2, "Beth")), (c1, profile(c1, "Ana"))].into();

        let views = merge_views(vec![a1.clone(), a2.clone(), a3.clone()], &profiles, &HashSet::new());
        let ids: Vec<Uuid> = views.iter().map(|v| v.appointment.id).collect();
        assert_eq!(ids, vec![a1.id, a2.id, a3.id]);
        assert_eq!(views[0].client_name, "Ana");
        assert_eq!(views[1].client_name, "Beth");
    }

    #[test]
    fn profile_miss_degrades_to_placeholder() {
        let a = appointment(Uuid::new_v4(), Uuid::new_v4(), 1);
        let views = merge_views(vec![a], &HashMap::new(), &HashSet::new());

        assert_eq!(views.len(), 1);
        assert_eq!(views[0].client_name, UNKNOWN_CLIENT);
        assert_eq!(views[0].client_image_url, "");
        assert!(!views[0].has_note);
    }

    #[test]
    fn note_coverage_flagged_per_appointment() {
        let a1 = appointment(Uuid::new_v4(), Uuid::new_v4(), 1);
        let a2 = appointment(Uuid::new_v4(), Uuid::new_v4(), 2);
        let noted: HashSet<Uuid> = [a1.id].into();

        let views = merge_views(vec![a1.clone(), a2.clone()], &HashMap::new(), &noted);
        assert!(views[0].has_note);
        assert!(!views[1].has_note);
    }

    #[test]
    fn merge_is_deterministic() {
        let c = Uuid::new_v4();
        let a = appointment(Uuid::new_v4(), c, 1);
        let profiles: HashMap<Uuid, Profile> = [(c, profile(c, "Ana"))].into();
        let noted = HashSet::new();

        let first = merge_views(vec![a.clone()], &profiles, &noted);
        let second = merge_views(vec![a], &profiles, &noted);
        assert_eq!(first, second);
    }
}
