use amqp_engine::EndpointState;

#[test]
fn open_close_lifecycle() {
    let mut state = EndpointState::new();

    assert!(state.open());
    assert!(state.need_open());
    assert!(!state.need_open());

    assert!(state.remote_opened());
    assert!(state.is_open());

    assert!(state.close());
    assert!(!state.close());
    assert!(state.need_close());
    assert!(!state.need_close());

    assert!(state.remote_closed());
    assert!(state.is_closed());
    assert!(state.has_settled());
}

#[test]
fn close_before_open_is_ignored() {
    let mut state = EndpointState::new();
    assert!(!state.close());
    assert!(state.has_settled());
    assert!(!state.is_closed());
}

#[test]
fn reconnect_resends_open() {
    let mut state = EndpointState::new();
    state.open();
    state.need_open();
    state.remote_opened();

    state.disconnected();

    assert!(state.is_local_open());
    assert!(!state.is_open());
    assert!(state.need_open());
    assert!(!state.need_open());
    assert!(state.remote_opened());
    assert!(state.is_open());
}

#[test]
fn reconnect_after_close_keeps_closed() {
    let mut state = EndpointState::new();
    state.open();
    state.remote_opened();
    state.close();
    state.disconnected();

    assert!(state.is_closed());
    assert!(!state.need_open());
    assert!(!state.need_close());
}
