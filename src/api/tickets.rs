//! Support tickets

use crate::error::ApiResult;

use super::ApiClient;
use super::types::{HelpTicket, OpenTicketRequest, TicketReplyRequest};

impl ApiClient {
    pub async fn list_tickets(&self) -> ApiResult<Vec<HelpTicket>> {
        self.require_token()?;
        self.get_list("/help-tickets").await
    }

    pub async fn get_ticket(&self, ticket_id: &str) -> ApiResult<HelpTicket> {
        self.require_token()?;
        self.get(&format!("/help-tickets/{ticket_id}")).await
    }

    pub async fn open_ticket(&self, request: &OpenTicketRequest) -> ApiResult<HelpTicket> {
        self.require_token()?;
        self.post("/help-tickets", request).await
    }

    pub async fn reply_to_ticket(&self, ticket_id: &str, body: &str) -> ApiResult<HelpTicket> {
        self.require_token()?;
        let request = TicketReplyRequest {
            body: body.to_string(),
        };
        self.post(&format!("/help-tickets/{ticket_id}/replies"), &request).await
    }

    pub async fn close_ticket(&self, ticket_id: &str) -> ApiResult<()> {
        self.require_token()?;
        self.post_empty(&format!("/help-tickets/{ticket_id}/close")).await
    }
}
