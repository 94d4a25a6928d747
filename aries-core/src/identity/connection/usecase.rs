use rst_common::standard::async_trait::async_trait;
use rst_common::with_logging::log::{debug, error, info, warn};

use crate::identity::diddoc::DIDDoc;
use crate::identity::messages::types::{AgentMessage, MessageError, MessageType};
use crate::identity::messages::{
    BasicMessage, Connection, ConnectionRequest, ConnectionResponse, Invitation, Message,
    ThreadDecorator, TrustPing,
};

use super::types::{
    ConnectionAPI, ConnectionEntityAccessor, ConnectionError, MessageHandler, RepoBuilder, State,
    TransportBuilder, WalletBuilder, RECORD_TYPE_CONNECTION,
};
use super::ConnectionRecord;

const STEP_CONNECTION_REQUEST: &str = "connection_request";
const STEP_TRUST_PING: &str = "trust_ping";
const STEP_BASIC_MESSAGE: &str = "basic_message";

fn invitation_error(err: MessageError) -> ConnectionError {
    match err {
        MessageError::InvalidInvitation(reason) => ConnectionError::InvalidInvitation(reason),
        other => ConnectionError::InvalidInvitation(other.to_string()),
    }
}

/// `Usecase` is base logic implementation for the [`ConnectionAPI`]
///
/// This object depends on the implementation of [`RepoBuilder`], [`WalletBuilder`]
/// and [`TransportBuilder`]. It holds no in-flight state, each step reloads the
/// record from the repository
#[derive(Clone)]
pub struct Usecase<TRepo, TWallet, TTransport>
where
    TRepo: RepoBuilder<EntityAccessor = ConnectionRecord>,
    TWallet: WalletBuilder,
    TTransport: TransportBuilder,
{
    repo: TRepo,
    wallet: TWallet,
    transport: TTransport,
    label: String,
    endpoint: Option<String>,
    greeting: Option<String>,
}

impl<TRepo, TWallet, TTransport> Usecase<TRepo, TWallet, TTransport>
where
    TRepo: RepoBuilder<EntityAccessor = ConnectionRecord>,
    TWallet: WalletBuilder,
    TTransport: TransportBuilder,
{
    pub fn new(repo: TRepo, wallet: TWallet, transport: TTransport, label: String) -> Self {
        Self {
            repo,
            wallet,
            transport,
            label,
            endpoint: None,
            greeting: None,
        }
    }

    /// `with_endpoint` sets our own inbound endpoint published in our `DID Doc`
    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// `with_greeting` sends a [`BasicMessage`] with the given content once a connection
    /// is complete
    pub fn with_greeting(mut self, content: String) -> Self {
        self.greeting = Some(content);
        self
    }

    async fn load_record(&self, id: String) -> Result<ConnectionRecord, ConnectionError> {
        self.repo
            .get_record(RECORD_TYPE_CONNECTION.to_string(), id)
            .await
    }

    async fn send_message(
        &self,
        record: &ConnectionRecord,
        step: &str,
        message: Message,
    ) -> Result<(), ConnectionError> {
        self.transport
            .send(record.get_endpoint(), message)
            .await
            .map_err(|err| {
                error!(
                    "[connection:send] record: {}, step: {}, error: {}",
                    record.get_id(),
                    step,
                    err
                );

                ConnectionError::TransportError {
                    record_id: record.get_id(),
                    step: step.to_string(),
                    reason: err.to_string(),
                }
            })
    }

    /// `finalize` sends the threaded trust ping for a responded record and mark it complete
    async fn finalize(
        &self,
        record: ConnectionRecord,
    ) -> Result<ConnectionRecord, ConnectionError> {
        let thread_id = record
            .get_thread_id()
            .ok_or(ConnectionError::MissingThread)?;

        let ping = TrustPing::new(Some(ThreadDecorator::new(thread_id)));
        self.send_message(&record, STEP_TRUST_PING, Message::TrustPing(ping))
            .await?;

        let mut completed = record;
        completed.complete()?;
        self.repo.update_record(&completed).await?;
        info!(
            "[connection:finalize] record: {}, state: {}",
            completed.get_id(),
            completed.get_state()
        );

        if let Some(content) = self.greeting.to_owned() {
            let greeting = BasicMessage::new(content);
            self.send_message(&completed, STEP_BASIC_MESSAGE, Message::BasicMessage(greeting))
                .await?;
        }

        Ok(completed)
    }
}

#[async_trait]
impl<TRepo, TWallet, TTransport> ConnectionAPI for Usecase<TRepo, TWallet, TTransport>
where
    TRepo: RepoBuilder<EntityAccessor = ConnectionRecord>,
    TWallet: WalletBuilder,
    TTransport: TransportBuilder,
{
    type EntityAccessor = ConnectionRecord;

    async fn receive_invitation_url(
        &self,
        url: String,
        auto_accept: bool,
    ) -> Result<Self::EntityAccessor, ConnectionError> {
        let invitation = Invitation::from_url(&url).map_err(|err| {
            warn!("[connection:receive_invitation_url] rejected: {}", err);
            invitation_error(err)
        })?;

        self.receive_invitation(invitation, auto_accept).await
    }

    async fn receive_invitation(
        &self,
        invitation: Invitation,
        auto_accept: bool,
    ) -> Result<Self::EntityAccessor, ConnectionError> {
        invitation.validate().map_err(invitation_error)?;

        let record = ConnectionRecord::new(invitation, self.label.to_owned(), auto_accept);
        self.repo.save_record(&record).await?;
        info!(
            "[connection:receive_invitation] record: {}, state: {}",
            record.get_id(),
            record.get_state()
        );

        if !auto_accept {
            return Ok(record);
        }

        self.send_request(record).await
    }

    async fn accept_invitation(&self, id: String) -> Result<Self::EntityAccessor, ConnectionError> {
        let record = self.load_record(id).await?;
        match record.get_state() {
            State::Invited | State::Requested => self.send_request(record).await,
            from => Err(ConnectionError::InvalidStateTransition {
                record_id: record.get_id(),
                from,
                to: State::Requested,
            }),
        }
    }

    async fn create_connection(
        &self,
        record: Self::EntityAccessor,
    ) -> Result<Self::EntityAccessor, ConnectionError> {
        if !record.get_state().can_transition_to(State::Requested) {
            return Err(ConnectionError::InvalidStateTransition {
                record_id: record.get_id(),
                from: record.get_state(),
                to: State::Requested,
            });
        }

        let (did, verkey) = self.wallet.create_did().await.map_err(|err| {
            error!(
                "[connection:create_connection] record: {}, wallet: {}",
                record.get_id(),
                err
            );
            err
        })?;

        let did_doc =
            DIDDoc::new_default(did.to_owned(), verkey.to_owned(), self.endpoint.to_owned());

        let mut requested = record;
        requested.bind_own_identity(did, verkey, did_doc)?;
        self.repo.update_record(&requested).await?;
        info!(
            "[connection:create_connection] record: {}, state: {}",
            requested.get_id(),
            requested.get_state()
        );

        Ok(requested)
    }

    async fn send_request(
        &self,
        record: Self::EntityAccessor,
    ) -> Result<Self::EntityAccessor, ConnectionError> {
        let record = match record.get_state() {
            State::Invited => self.create_connection(record).await?,
            State::Requested => record,
            from => {
                return Err(ConnectionError::InvalidStateTransition {
                    record_id: record.get_id(),
                    from,
                    to: State::Requested,
                })
            }
        };

        let did = record.get_did().ok_or(ConnectionError::InvalidDIDDoc(
            "missing own did".to_string(),
        ))?;

        let did_doc = record.get_did_doc().ok_or(ConnectionError::InvalidDIDDoc(
            "missing own did doc".to_string(),
        ))?;

        did_doc
            .validate()
            .map_err(|err| ConnectionError::InvalidDIDDoc(err.to_string()))?;

        let request = ConnectionRequest::new(
            record.get_id(),
            record.get_label(),
            Connection::new(did, did_doc),
        );

        self.send_message(
            &record,
            STEP_CONNECTION_REQUEST,
            Message::ConnectionRequest(request),
        )
        .await?;

        debug!(
            "[connection:send_request] request sent, record: {}",
            record.get_id()
        );
        Ok(record)
    }

    async fn process_response(
        &self,
        response: ConnectionResponse,
    ) -> Result<Self::EntityAccessor, ConnectionError> {
        let thread_id = response
            .get_thid()
            .map_err(|_| ConnectionError::MissingThread)?;

        let record = self.load_record(thread_id.to_owned()).await?;
        let signer = response.get_signer();
        let binding_key = record.get_invitation().get_binding_key();
        if binding_key.as_deref() != Some(signer.as_str()) {
            error!(
                "[connection:process_response] untrusted signer, record: {}, signer: {}",
                record.get_id(),
                signer
            );

            return Err(ConnectionError::UntrustedSigner {
                record_id: record.get_id(),
                thread_id,
                signer,
            });
        }

        match record.get_state() {
            State::Responded | State::Complete => {
                warn!(
                    "[connection:process_response] duplicate response, record: {}, state: {}",
                    record.get_id(),
                    record.get_state()
                );
                return Ok(record);
            }
            State::Requested => {}
            from => {
                return Err(ConnectionError::InvalidStateTransition {
                    record_id: record.get_id(),
                    from,
                    to: State::Responded,
                })
            }
        }

        let signature = response.get_signature();
        let sig_data = signature
            .get_sig_data()
            .map_err(|err| ConnectionError::MessageError(err.to_string()))?;
        let sig_value = signature
            .get_signature()
            .map_err(|err| ConnectionError::MessageError(err.to_string()))?;

        let verified = self
            .wallet
            .verify(signer.to_owned(), sig_data, sig_value)
            .await?;

        if !verified {
            error!(
                "[connection:process_response] invalid signature, record: {}, signer: {}",
                record.get_id(),
                signer
            );

            return Err(ConnectionError::InvalidSignature {
                record_id: record.get_id(),
                signer,
            });
        }

        let connection = response
            .get_connection()
            .map_err(|err| ConnectionError::MessageError(err.to_string()))?;

        if connection.did != connection.did_doc.get_id() {
            error!(
                "[connection:process_response] did mismatch, record: {}, did: {}",
                record.get_id(),
                connection.did
            );

            return Err(ConnectionError::InvalidDIDDoc(format!(
                "connection did {} does not match the did doc id {}",
                connection.did,
                connection.did_doc.get_id()
            )));
        }

        let mut responded = record;
        responded.bind_peer_identity(connection.did, connection.did_doc, thread_id)?;
        self.repo.update_record(&responded).await?;
        info!(
            "[connection:process_response] record: {}, state: {}",
            responded.get_id(),
            responded.get_state()
        );

        self.finalize(responded).await
    }

    async fn complete_connection(
        &self,
        id: String,
    ) -> Result<Self::EntityAccessor, ConnectionError> {
        let record = self.load_record(id).await?;
        match record.get_state() {
            State::Complete => Ok(record),
            State::Responded => self.finalize(record).await,
            from => Err(ConnectionError::InvalidStateTransition {
                record_id: record.get_id(),
                from,
                to: State::Complete,
            }),
        }
    }

    async fn retrieve_connection_record(
        &self,
        id: String,
    ) -> Result<Self::EntityAccessor, ConnectionError> {
        self.load_record(id).await
    }
}

#[async_trait]
impl<TRepo, TWallet, TTransport> MessageHandler for Usecase<TRepo, TWallet, TTransport>
where
    TRepo: RepoBuilder<EntityAccessor = ConnectionRecord>,
    TWallet: WalletBuilder,
    TTransport: TransportBuilder,
{
    fn supported_messages(&self) -> Vec<MessageType> {
        vec![MessageType::Invitation, MessageType::ConnectionResponse]
    }

    async fn handle(&self, message: Message) -> Result<(), ConnectionError> {
        match message {
            Message::Invitation(invitation) => {
                self.receive_invitation(invitation, true).await.map(|_| ())
            }
            Message::ConnectionResponse(response) => {
                self.process_response(response).await.map(|_| ())
            }
            other => {
                debug!(
                    "[connection:handle] ignored message: {}, type: {}",
                    other.get_id(),
                    other.message_type().as_uri()
                );
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use mockall::mock;
    use rst_common::with_tokio::tokio;

    use crate::identity::connection::types::Endpoint;
    use crate::identity::messages::SignatureDecorator;

    mock!(
        FakeRepo{}

        impl Clone for FakeRepo {
            fn clone(&self) -> Self;
        }

        #[async_trait]
        impl RepoBuilder for FakeRepo {
            type EntityAccessor = ConnectionRecord;

            async fn save_record(&self, record: &ConnectionRecord) -> Result<(), ConnectionError>;
            async fn update_record(&self, record: &ConnectionRecord) -> Result<(), ConnectionError>;
            async fn get_record(
                &self,
                record_type: String,
                id: String,
            ) -> Result<ConnectionRecord, ConnectionError>;
        }
    );

    mock!(
        FakeWallet{}

        impl Clone for FakeWallet {
            fn clone(&self) -> Self;
        }

        #[async_trait]
        impl WalletBuilder for FakeWallet {
            async fn create_did(&self) -> Result<(String, String), ConnectionError>;
            async fn verify(
                &self,
                verkey: String,
                data: Vec<u8>,
                signature: Vec<u8>,
            ) -> Result<bool, ConnectionError>;
        }
    );

    mock!(
        FakeTransport{}

        impl Clone for FakeTransport {
            fn clone(&self) -> Self;
        }

        #[async_trait]
        impl TransportBuilder for FakeTransport {
            async fn send(&self, endpoint: Endpoint, message: Message) -> Result<(), ConnectionError>;
        }
    );

    type Records = Arc<Mutex<HashMap<String, ConnectionRecord>>>;
    type Outbox = Arc<Mutex<Vec<(Endpoint, Message)>>>;

    const INVITATION_BASE_URL: &str = "https://faber.example/invite";
    const INVITATION_ENDPOINT: &str = "https://faber.example/agent";
    const PAIRWISE_ENDPOINT: &str = "https://faber.example/pairwise";

    fn generate_invitation() -> Invitation {
        Invitation::new(
            "Faber".to_string(),
            vec!["Kinv".to_string()],
            INVITATION_ENDPOINT.to_string(),
            vec![],
        )
    }

    fn generate_invitation_url() -> String {
        generate_invitation().to_url(INVITATION_BASE_URL).unwrap()
    }

    fn generate_response(thid: String, signer: &str) -> ConnectionResponse {
        generate_response_with_did(thid, signer, "did:peer:xyz")
    }

    fn generate_response_with_did(thid: String, signer: &str, did: &str) -> ConnectionResponse {
        let doc = DIDDoc::new_default(
            "did:peer:xyz".to_string(),
            "Kxyz".to_string(),
            Some(PAIRWISE_ENDPOINT.to_string()),
        );

        let connection = Connection::new(did.to_string(), doc);
        let sig_data = SignatureDecorator::build_sig_data(&connection, 1_600_000_000).unwrap();
        let sig = SignatureDecorator::new(&sig_data, b"fake-signature", signer.to_string());

        ConnectionResponse::new(ThreadDecorator::new(thid), sig)
    }

    fn generate_repo(records: Records) -> MockFakeRepo {
        let mut repo = MockFakeRepo::new();

        let save_records = records.clone();
        repo.expect_save_record().returning(move |record| {
            let mut stored = save_records.lock().unwrap();
            if stored.contains_key(&record.get_id()) {
                return Err(ConnectionError::RecordExists(record.get_id()));
            }

            stored.insert(record.get_id(), record.clone());
            Ok(())
        });

        let update_records = records.clone();
        repo.expect_update_record().returning(move |record| {
            let mut stored = update_records.lock().unwrap();
            if !stored.contains_key(&record.get_id()) {
                return Err(ConnectionError::RecordNotFound(record.get_id()));
            }

            stored.insert(record.get_id(), record.clone());
            Ok(())
        });

        repo.expect_get_record()
            .withf(|record_type: &String, _: &String| record_type == RECORD_TYPE_CONNECTION)
            .returning(move |_, id| {
                records
                    .lock()
                    .unwrap()
                    .get(&id)
                    .cloned()
                    .ok_or(ConnectionError::RecordNotFound(id))
            });

        repo
    }

    fn generate_wallet(create_times: usize, verified: bool) -> MockFakeWallet {
        let mut wallet = MockFakeWallet::new();
        wallet
            .expect_create_did()
            .times(create_times)
            .returning(|| Ok(("did:peer:abc".to_string(), "Kmine".to_string())));

        wallet
            .expect_verify()
            .withf(|verkey: &String, data: &Vec<u8>, signature: &Vec<u8>| {
                verkey == "Kinv" && data.len() > 8 && signature == b"fake-signature"
            })
            .returning(move |_, _, _| Ok(verified));

        wallet
    }

    fn generate_transport(outbox: Outbox, down: Arc<AtomicBool>) -> MockFakeTransport {
        let mut transport = MockFakeTransport::new();
        transport.expect_send().returning(move |endpoint, message| {
            if down.load(Ordering::SeqCst) {
                return Err(ConnectionError::TransportError {
                    record_id: "".to_string(),
                    step: "send".to_string(),
                    reason: "connection refused".to_string(),
                });
            }

            outbox.lock().unwrap().push((endpoint, message));
            Ok(())
        });

        transport
    }

    fn generate_usecase<TRepo, TWallet, TTransport>(
        repo: TRepo,
        wallet: TWallet,
        transport: TTransport,
    ) -> Usecase<TRepo, TWallet, TTransport>
    where
        TRepo: RepoBuilder<EntityAccessor = ConnectionRecord>,
        TWallet: WalletBuilder,
        TTransport: TransportBuilder,
    {
        Usecase::new(repo, wallet, transport, "Alice".to_string())
    }

    fn count_sent(outbox: &Outbox, message_type: MessageType) -> usize {
        outbox
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, msg)| msg.message_type() == message_type)
            .count()
    }

    #[tokio::test]
    async fn test_receive_invitation_url_auto_accept() {
        let records: Records = Arc::new(Mutex::new(HashMap::new()));
        let outbox: Outbox = Arc::new(Mutex::new(Vec::new()));

        let uc = generate_usecase(
            generate_repo(records.clone()),
            generate_wallet(1, true),
            generate_transport(outbox.clone(), Arc::new(AtomicBool::new(false))),
        );

        let record = uc
            .receive_invitation_url(generate_invitation_url(), true)
            .await
            .unwrap();

        assert_eq!(record.get_state(), State::Requested);
        assert_eq!(record.get_did(), Some("did:peer:abc".to_string()));
        assert_eq!(record.get_verkey(), Some("Kmine".to_string()));

        let stored = uc.retrieve_connection_record(record.get_id()).await.unwrap();
        assert_eq!(stored.get_state(), State::Requested);
        assert_eq!(stored.get_did_doc().unwrap().get_verkey(), Some("Kmine".to_string()));

        let sent = outbox.lock().unwrap();
        assert_eq!(sent.len(), 1);

        let (endpoint, message) = &sent[0];
        assert_eq!(endpoint.service_endpoint, INVITATION_ENDPOINT);
        assert_eq!(endpoint.recipient_keys, vec!["Kinv".to_string()]);

        match message {
            Message::ConnectionRequest(request) => {
                assert_eq!(request.get_id(), record.get_id());
                assert_eq!(request.get_label(), "Alice");
                assert_eq!(request.get_connection().did, "did:peer:abc");
            }
            _ => panic!("expected connection request"),
        }
    }

    #[tokio::test]
    async fn test_receive_invitation_manual_accept() {
        let records: Records = Arc::new(Mutex::new(HashMap::new()));
        let outbox: Outbox = Arc::new(Mutex::new(Vec::new()));

        let uc = generate_usecase(
            generate_repo(records.clone()),
            generate_wallet(1, true),
            generate_transport(outbox.clone(), Arc::new(AtomicBool::new(false))),
        );

        let record = uc
            .receive_invitation_url(generate_invitation_url(), false)
            .await
            .unwrap();
        assert_eq!(record.get_state(), State::Invited);
        assert!(record.get_did().is_none());
        assert!(outbox.lock().unwrap().is_empty());

        let stored = uc.retrieve_connection_record(record.get_id()).await.unwrap();
        assert_eq!(stored.get_state(), State::Invited);

        let accepted = uc.accept_invitation(record.get_id()).await.unwrap();
        assert_eq!(accepted.get_state(), State::Requested);
        assert_eq!(count_sent(&outbox, MessageType::ConnectionRequest), 1)
    }

    #[tokio::test]
    async fn test_receive_invitation_url_malformed() {
        let empty_keys = Invitation::new(
            "Faber".to_string(),
            vec![],
            INVITATION_ENDPOINT.to_string(),
            vec![],
        )
        .to_url(INVITATION_BASE_URL)
        .unwrap();

        let inputs = vec![
            format!("{}?c_i=%%%invalid", INVITATION_BASE_URL),
            format!("{}?other=value", INVITATION_BASE_URL),
            format!("{}?c_i=bm90LWpzb24", INVITATION_BASE_URL),
            "not a url".to_string(),
            empty_keys,
        ];

        for input in inputs {
            let mut repo = MockFakeRepo::new();
            repo.expect_save_record().times(0);

            let uc = generate_usecase(
                repo,
                generate_wallet(0, true),
                generate_transport(
                    Arc::new(Mutex::new(Vec::new())),
                    Arc::new(AtomicBool::new(false)),
                ),
            );

            let output = uc.receive_invitation_url(input.clone(), true).await;
            assert!(
                matches!(output, Err(ConnectionError::InvalidInvitation(_))),
                "input: {}",
                input
            );
        }
    }

    #[tokio::test]
    async fn test_connection_end_to_end() {
        let records: Records = Arc::new(Mutex::new(HashMap::new()));
        let outbox: Outbox = Arc::new(Mutex::new(Vec::new()));

        let uc = generate_usecase(
            generate_repo(records.clone()),
            generate_wallet(1, true),
            generate_transport(outbox.clone(), Arc::new(AtomicBool::new(false))),
        );

        let record = uc
            .receive_invitation_url(generate_invitation_url(), true)
            .await
            .unwrap();

        let response = generate_response(record.get_id(), "Kinv");
        let completed = uc.process_response(response).await.unwrap();
        assert_eq!(completed.get_state(), State::Complete);
        assert_eq!(completed.get_their_did(), Some("did:peer:xyz".to_string()));
        assert_eq!(completed.get_thread_id(), Some(record.get_id()));

        let stored = uc.retrieve_connection_record(record.get_id()).await.unwrap();
        assert_eq!(stored.get_state(), State::Complete);
        assert_eq!(
            stored.get_their_did_doc().unwrap().get_verkey(),
            Some("Kxyz".to_string())
        );

        let sent = outbox.lock().unwrap();
        assert_eq!(sent.len(), 2);

        let (endpoint, ping) = &sent[1];
        assert_eq!(endpoint.service_endpoint, PAIRWISE_ENDPOINT);
        assert_eq!(ping.message_type(), MessageType::TrustPing);
        assert_eq!(ping.get_thread().unwrap().get_thid().unwrap(), record.get_id());

        match ping {
            Message::TrustPing(trust_ping) => assert!(trust_ping.is_response_requested()),
            _ => panic!("expected trust ping"),
        }
    }

    #[tokio::test]
    async fn test_process_response_untrusted_signer() {
        let records: Records = Arc::new(Mutex::new(HashMap::new()));
        let outbox: Outbox = Arc::new(Mutex::new(Vec::new()));

        let mut wallet = MockFakeWallet::new();
        wallet
            .expect_create_did()
            .times(1)
            .returning(|| Ok(("did:peer:abc".to_string(), "Kmine".to_string())));
        wallet.expect_verify().times(0);

        let uc = generate_usecase(
            generate_repo(records.clone()),
            wallet,
            generate_transport(outbox.clone(), Arc::new(AtomicBool::new(false))),
        );

        let record = uc
            .receive_invitation_url(generate_invitation_url(), true)
            .await
            .unwrap();

        let response = generate_response(record.get_id(), "Kother");
        let output = uc.process_response(response).await;
        assert_eq!(
            output.unwrap_err(),
            ConnectionError::UntrustedSigner {
                record_id: record.get_id(),
                thread_id: record.get_id(),
                signer: "Kother".to_string(),
            }
        );

        let stored = uc.retrieve_connection_record(record.get_id()).await.unwrap();
        assert_eq!(stored.get_state(), State::Requested);
        assert!(stored.get_their_did().is_none());
        assert_eq!(count_sent(&outbox, MessageType::TrustPing), 0)
    }

    #[tokio::test]
    async fn test_process_response_untrusted_signer_any_state() {
        let records: Records = Arc::new(Mutex::new(HashMap::new()));
        let outbox: Outbox = Arc::new(Mutex::new(Vec::new()));

        let uc = generate_usecase(
            generate_repo(records.clone()),
            generate_wallet(1, true),
            generate_transport(outbox.clone(), Arc::new(AtomicBool::new(false))),
        );

        let completed = uc
            .receive_invitation_url(generate_invitation_url(), true)
            .await
            .unwrap();
        uc.process_response(generate_response(completed.get_id(), "Kinv"))
            .await
            .unwrap();

        let invited = uc
            .receive_invitation(generate_invitation(), false)
            .await
            .unwrap();

        let sent_before = outbox.lock().unwrap().len();
        for (record_id, state) in [
            (completed.get_id(), State::Complete),
            (invited.get_id(), State::Invited),
        ] {
            let output = uc
                .process_response(generate_response(record_id.clone(), "Kother"))
                .await;
            assert_eq!(
                output.unwrap_err(),
                ConnectionError::UntrustedSigner {
                    record_id: record_id.clone(),
                    thread_id: record_id.clone(),
                    signer: "Kother".to_string(),
                }
            );

            let stored = uc.retrieve_connection_record(record_id).await.unwrap();
            assert_eq!(stored.get_state(), state);
        }

        assert_eq!(outbox.lock().unwrap().len(), sent_before)
    }

    #[tokio::test]
    async fn test_process_response_did_mismatch() {
        let records: Records = Arc::new(Mutex::new(HashMap::new()));
        let outbox: Outbox = Arc::new(Mutex::new(Vec::new()));

        let uc = generate_usecase(
            generate_repo(records.clone()),
            generate_wallet(1, true),
            generate_transport(outbox.clone(), Arc::new(AtomicBool::new(false))),
        );

        let record = uc
            .receive_invitation_url(generate_invitation_url(), true)
            .await
            .unwrap();

        let response = generate_response_with_did(record.get_id(), "Kinv", "did:peer:other");
        let output = uc.process_response(response).await;
        assert!(matches!(output, Err(ConnectionError::InvalidDIDDoc(_))));

        let stored = uc.retrieve_connection_record(record.get_id()).await.unwrap();
        assert_eq!(stored.get_state(), State::Requested);
        assert!(stored.get_their_did().is_none());
        assert_eq!(count_sent(&outbox, MessageType::TrustPing), 0)
    }

    #[tokio::test]
    async fn test_process_response_invalid_signature() {
        let records: Records = Arc::new(Mutex::new(HashMap::new()));
        let outbox: Outbox = Arc::new(Mutex::new(Vec::new()));

        let uc = generate_usecase(
            generate_repo(records.clone()),
            generate_wallet(1, false),
            generate_transport(outbox.clone(), Arc::new(AtomicBool::new(false))),
        );

        let record = uc
            .receive_invitation_url(generate_invitation_url(), true)
            .await
            .unwrap();

        let output = uc
            .process_response(generate_response(record.get_id(), "Kinv"))
            .await;
        assert!(matches!(
            output,
            Err(ConnectionError::InvalidSignature { .. })
        ));

        let stored = uc.retrieve_connection_record(record.get_id()).await.unwrap();
        assert_eq!(stored.get_state(), State::Requested)
    }

    #[tokio::test]
    async fn test_process_response_duplicate() {
        let records: Records = Arc::new(Mutex::new(HashMap::new()));
        let outbox: Outbox = Arc::new(Mutex::new(Vec::new()));

        let uc = generate_usecase(
            generate_repo(records.clone()),
            generate_wallet(1, true),
            generate_transport(outbox.clone(), Arc::new(AtomicBool::new(false))),
        )
        .with_greeting("hello".to_string());

        let record = uc
            .receive_invitation_url(generate_invitation_url(), true)
            .await
            .unwrap();

        let response = generate_response(record.get_id(), "Kinv");
        let first = uc.process_response(response.clone()).await.unwrap();
        assert_eq!(first.get_state(), State::Complete);

        let second = uc.process_response(response).await.unwrap();
        assert_eq!(second.get_state(), State::Complete);
        assert_eq!(second.get_updated_at(), first.get_updated_at());

        assert_eq!(count_sent(&outbox, MessageType::TrustPing), 1);
        assert_eq!(count_sent(&outbox, MessageType::BasicMessage), 1);

        let sent = outbox.lock().unwrap();
        match &sent[2].1 {
            Message::BasicMessage(greeting) => {
                assert_eq!(greeting.get_content(), "hello");
                assert!(!greeting.get_sent_time().is_empty());
            }
            other => panic!("expected basic message, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_process_response_missing_thread() {
        let uc = generate_usecase(
            MockFakeRepo::new(),
            generate_wallet(0, true),
            generate_transport(
                Arc::new(Mutex::new(Vec::new())),
                Arc::new(AtomicBool::new(false)),
            ),
        );

        let mut response = generate_response("".to_string(), "Kinv");
        let output = uc.process_response(response.clone()).await;
        assert_eq!(output.unwrap_err(), ConnectionError::MissingThread);

        response = ConnectionResponse::new(
            ThreadDecorator::default(),
            response.get_signature().to_owned(),
        );
        let output = uc.process_response(response).await;
        assert_eq!(output.unwrap_err(), ConnectionError::MissingThread)
    }

    #[tokio::test]
    async fn test_process_response_unknown_record() {
        let records: Records = Arc::new(Mutex::new(HashMap::new()));
        let uc = generate_usecase(
            generate_repo(records),
            generate_wallet(0, true),
            generate_transport(
                Arc::new(Mutex::new(Vec::new())),
                Arc::new(AtomicBool::new(false)),
            ),
        );

        let output = uc
            .process_response(generate_response("unknown-id".to_string(), "Kinv"))
            .await;
        assert_eq!(
            output.unwrap_err(),
            ConnectionError::RecordNotFound("unknown-id".to_string())
        )
    }

    #[tokio::test]
    async fn test_process_response_out_of_order() {
        let records: Records = Arc::new(Mutex::new(HashMap::new()));
        let uc = generate_usecase(
            generate_repo(records.clone()),
            generate_wallet(0, true),
            generate_transport(
                Arc::new(Mutex::new(Vec::new())),
                Arc::new(AtomicBool::new(false)),
            ),
        );

        let record = uc
            .receive_invitation(generate_invitation(), false)
            .await
            .unwrap();

        let output = uc
            .process_response(generate_response(record.get_id(), "Kinv"))
            .await;
        assert!(matches!(
            output,
            Err(ConnectionError::InvalidStateTransition {
                from: State::Invited,
                to: State::Responded,
                ..
            })
        ))
    }

    #[tokio::test]
    async fn test_create_connection_wallet_failure() {
        let records: Records = Arc::new(Mutex::new(HashMap::new()));
        let outbox: Outbox = Arc::new(Mutex::new(Vec::new()));

        let mut wallet = MockFakeWallet::new();
        wallet
            .expect_create_did()
            .times(1)
            .returning(|| Err(ConnectionError::WalletError("wallet is closed".to_string())));

        let uc = generate_usecase(
            generate_repo(records.clone()),
            wallet,
            generate_transport(outbox.clone(), Arc::new(AtomicBool::new(false))),
        );

        let record = uc
            .receive_invitation(generate_invitation(), false)
            .await
            .unwrap();

        let output = uc.create_connection(record.clone()).await;
        assert_eq!(
            output.unwrap_err(),
            ConnectionError::WalletError("wallet is closed".to_string())
        );

        let stored = uc.retrieve_connection_record(record.get_id()).await.unwrap();
        assert_eq!(stored.get_state(), State::Invited);
        assert!(stored.get_did().is_none());
        assert!(outbox.lock().unwrap().is_empty())
    }

    #[tokio::test]
    async fn test_send_request_transport_failure_and_retry() {
        let records: Records = Arc::new(Mutex::new(HashMap::new()));
        let outbox: Outbox = Arc::new(Mutex::new(Vec::new()));
        let down = Arc::new(AtomicBool::new(true));

        let uc = generate_usecase(
            generate_repo(records.clone()),
            generate_wallet(1, true),
            generate_transport(outbox.clone(), down.clone()),
        );

        let output = uc
            .receive_invitation_url(generate_invitation_url(), true)
            .await;

        let record_id = match output {
            Err(ConnectionError::TransportError {
                record_id, step, ..
            }) => {
                assert_eq!(step, STEP_CONNECTION_REQUEST);
                record_id
            }
            other => panic!("unexpected output: {:?}", other),
        };

        let stored = uc.retrieve_connection_record(record_id.clone()).await.unwrap();
        assert_eq!(stored.get_state(), State::Requested);
        assert_eq!(stored.get_did(), Some("did:peer:abc".to_string()));

        down.store(false, Ordering::SeqCst);
        let resent = uc.accept_invitation(record_id).await.unwrap();
        assert_eq!(resent.get_state(), State::Requested);
        assert_eq!(resent.get_did(), Some("did:peer:abc".to_string()));
        assert_eq!(count_sent(&outbox, MessageType::ConnectionRequest), 1)
    }

    #[tokio::test]
    async fn test_complete_connection_after_trust_ping_failure() {
        let records: Records = Arc::new(Mutex::new(HashMap::new()));
        let outbox: Outbox = Arc::new(Mutex::new(Vec::new()));
        let down = Arc::new(AtomicBool::new(false));

        let uc = generate_usecase(
            generate_repo(records.clone()),
            generate_wallet(1, true),
            generate_transport(outbox.clone(), down.clone()),
        );

        let record = uc
            .receive_invitation_url(generate_invitation_url(), true)
            .await
            .unwrap();

        down.store(true, Ordering::SeqCst);
        let output = uc
            .process_response(generate_response(record.get_id(), "Kinv"))
            .await;
        assert!(matches!(
            output,
            Err(ConnectionError::TransportError { ref step, .. }) if step == STEP_TRUST_PING
        ));

        let stored = uc.retrieve_connection_record(record.get_id()).await.unwrap();
        assert_eq!(stored.get_state(), State::Responded);

        down.store(false, Ordering::SeqCst);
        let completed = uc.complete_connection(record.get_id()).await.unwrap();
        assert_eq!(completed.get_state(), State::Complete);

        let again = uc.complete_connection(record.get_id()).await.unwrap();
        assert_eq!(again.get_state(), State::Complete);
        assert_eq!(count_sent(&outbox, MessageType::TrustPing), 1)
    }

    #[tokio::test]
    async fn test_handle_messages() {
        let records: Records = Arc::new(Mutex::new(HashMap::new()));
        let outbox: Outbox = Arc::new(Mutex::new(Vec::new()));

        let uc = generate_usecase(
            generate_repo(records.clone()),
            generate_wallet(1, true),
            generate_transport(outbox.clone(), Arc::new(AtomicBool::new(false))),
        );

        assert_eq!(
            uc.supported_messages(),
            vec![MessageType::Invitation, MessageType::ConnectionResponse]
        );

        let ignored = uc
            .handle(Message::BasicMessage(BasicMessage::new("hi".to_string())))
            .await;
        assert!(ignored.is_ok());
        assert!(records.lock().unwrap().is_empty());

        uc.handle(Message::Invitation(generate_invitation()))
            .await
            .unwrap();

        let record_id = {
            let stored = records.lock().unwrap();
            assert_eq!(stored.len(), 1);
            stored.keys().next().cloned().unwrap()
        };

        uc.handle(Message::ConnectionResponse(generate_response(
            record_id.clone(),
            "Kinv",
        )))
        .await
        .unwrap();

        let stored = uc.retrieve_connection_record(record_id).await.unwrap();
        assert_eq!(stored.get_state(), State::Complete)
    }
}
