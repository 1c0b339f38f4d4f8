//! Game catalog and round-report queries.

use serde::Serialize;
use serde_json::Value;

use crate::client::SudClient;
use crate::endpoints::ApiOperation;
use crate::errors::Result;

/// Engine version advertised when listing games; games incompatible with it
/// are filtered out server-side.
const UNITY_ENGINE_VERSION: &str = "2020.3.25f1c1";

/// Client platform a game list is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Ios,
    Android,
    Web,
}

impl Platform {
    /// Numeric wire code.
    pub fn code(self) -> u8 {
        match self {
            Self::Ios => 1,
            Self::Android => 2,
            Self::Web => 3,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct GameListRequest {
    platform: u8,
    unity_engine_version: &'static str,
}

#[derive(Debug, Clone, Serialize)]
struct ReportInfoRequest<'a> {
    report_game_info_key: &'a str,
    game_round_id: &'a str,
}

#[derive(Debug, Clone, Serialize)]
struct ReportInfoPageRequest<'a> {
    app_id: &'a str,
    app_secret: &'a str,
    room_id: &'a str,
    page_no: u32,
    page_size: u32,
}

impl SudClient {
    /// List the games available to this application on the given platform.
    pub async fn game_list(&self, platform: Platform) -> Result<Value> {
        let url = self.api_url(ApiOperation::MgList).await?;
        let request = GameListRequest {
            platform: platform.code(),
            unity_engine_version: UNITY_ENGINE_VERSION,
        };
        self.post_signed(url, &request).await
    }

    /// Query the report data of one round, by the key passed at
    /// `game_start` or by the platform's round id.
    pub async fn query_game_report_info(&self, report_game_info_key: &str, game_round_id: &str) -> Result<Value> {
        let url = self.api_url(ApiOperation::QueryGameReportInfo).await?;
        let request = ReportInfoRequest {
            report_game_info_key,
            game_round_id,
        };
        self.post_signed(url, &request).await
    }

    /// Page through a room's reported rounds.
    ///
    /// This legacy operation authenticates through body credentials in
    /// addition to the signed header; they are filled in from the client
    /// configuration.
    pub async fn game_report_info_page(&self, room_id: &str, page_no: u32, page_size: u32) -> Result<Value> {
        let url = self.api_url(ApiOperation::GameReportInfoPage).await?;
        let request = ReportInfoPageRequest {
            app_id: &self.config.app_id,
            app_secret: &self.config.app_secret,
            room_id,
            page_no,
            page_size,
        };
        self.post_signed(url, &request).await
    }
}
