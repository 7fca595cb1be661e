//! Assembly status and state vocabularies.
//!
//! `Status` is the business-facing progression shown to users and carried in
//! notifications. `State` is the operational phase that drives the
//! alive/pending/destroyed/stopped/suspended predicates. Both travel as plain
//! strings on the wire; unknown values are preserved verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            /// Value outside the known vocabulary, kept as received.
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $text,)+
                    $name::Other(value) => value.as_str(),
                }
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                match value {
                    $($text => $name::$variant,)+
                    other => $name::Other(other.to_string()),
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                $name::from(value.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum! {
    /// Operational phase of an assembly.
    State {
        PreDeployError => "predeploy_error",
        Parked => "parked",
        Initializing => "initializing",
        Initialized => "initialized",
        Bootstrapping => "bootstrapping",
        Bootstrapped => "bootstrapped",
        Running => "running",
        Starting => "starting",
        Started => "started",
        Stopping => "stopping",
        Stopped => "stopped",
        Suspending => "suspending",
        Suspended => "suspended",
        Destroying => "destroying",
        Destroyed => "destroyed",
    }
}

impl Default for State {
    fn default() -> Self {
        State::Initializing
    }
}

impl State {
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            State::PreDeployError | State::Parked | State::Initializing
        )
    }

    pub fn is_destroyed(&self) -> bool {
        matches!(self, State::Destroying | State::Destroyed)
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, State::Stopped | State::Stopping)
    }

    pub fn is_suspended(&self) -> bool {
        matches!(self, State::Suspended | State::Suspending)
    }

    /// Stopped and suspended workloads still count as alive.
    pub fn is_alive(&self) -> bool {
        !self.is_pending() && !self.is_destroyed()
    }
}

string_enum! {
    /// Human-facing lifecycle status of an assembly or policy.
    Status {
        Initializing => "initializing",
        Launching => "launching",
        Launched => "launched",
        Bootstrapping => "bootstrapping",
        Bootstrapped => "bootstrapped",
        Running => "running",
        Starting => "starting",
        Started => "started",
        Stopping => "stopping",
        Stopped => "stopped",
        Restarting => "restarting",
        Restarted => "restarted",
        Upgraded => "upgraded",
        Suspending => "suspending",
        Suspended => "suspended",
        Destroying => "destroying",
        Destroyed => "destroyed",
        Error => "error",
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::Launching
    }
}

const EVENT_TYPE_PREFIX: &str = "compute.instance";

impl Status {
    /// Notification text for this status about `subject`, usually the
    /// assembly name or the message of a failing cause.
    pub fn description(&self, subject: &str) -> String {
        match self {
            Status::Initializing => format!("{} is initializing.", subject),
            Status::Launching => format!("{} is launching.", subject),
            Status::Launched => format!("{} was launched.", subject),
            Status::Bootstrapping => format!("{} is bootstrapping.", subject),
            Status::Bootstrapped => format!("{} was bootstrapped.", subject),
            Status::Running => format!("{} is running.", subject),
            Status::Starting => format!("{} is starting.", subject),
            Status::Started => format!("{} was started.", subject),
            Status::Stopping => format!("{} is stopping.", subject),
            Status::Stopped => format!("{} was stopped.", subject),
            Status::Restarting => format!("{} is restarting.", subject),
            Status::Restarted => format!("{} was restarted.", subject),
            Status::Upgraded => format!("{} was upgraded.", subject),
            Status::Suspending => format!("{} is suspending.", subject),
            Status::Suspended => format!("{} was suspended.", subject),
            Status::Destroying => format!("{} is being destroyed.", subject),
            Status::Destroyed => format!("{} was destroyed.", subject),
            Status::Error => format!("Oops, something went wrong: {}", subject),
            Status::Other(status) => format!("{} is {}.", subject, status),
        }
    }

    /// Event-type code attached to status notifications.
    pub fn event_type(&self) -> String {
        match self {
            Status::Other(_) => format!("{}.status", EVENT_TYPE_PREFIX),
            known => format!("{}.{}", EVENT_TYPE_PREFIX, known.as_str()),
        }
    }
}
