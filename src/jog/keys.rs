use std::collections::VecDeque;
use std::str::FromStr;

use tokio::sync::mpsc;

use crate::error::InputError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Plus,
    Minus,
    Print,
    Cancel,
}

impl Key {
    pub const ALL: [Key; 8] = [
        Key::Left,
        Key::Right,
        Key::Up,
        Key::Down,
        Key::Plus,
        Key::Minus,
        Key::Print,
        Key::Cancel,
    ];

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl FromStr for Key {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Key::Left),
            "right" => Ok(Key::Right),
            "up" => Ok(Key::Up),
            "down" => Ok(Key::Down),
            "plus" | "+" | "=" => Ok(Key::Plus),
            "minus" | "-" => Ok(Key::Minus),
            "print" | "p" => Ok(Key::Print),
            "cancel" | "esc" => Ok(Key::Cancel),
            _ => Err(InputError::UnknownKey(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    pressed: u8,
}

impl KeyState {
    pub fn released() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: Key) -> Self {
        self.pressed |= key.bit();
        self
    }

    pub fn of(keys: &[Key]) -> Self {
        keys.iter().fold(Self::released(), |state, key| state.with(*key))
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed & key.bit() != 0
    }

    pub fn rising(&self, previous: &KeyState, key: Key) -> bool {
        self.is_pressed(key) && !previous.is_pressed(key)
    }

    pub fn falling(&self, previous: &KeyState, key: Key) -> bool {
        !self.is_pressed(key) && previous.is_pressed(key)
    }
}

/// Whitespace-separated names of the keys currently held; empty means none.
impl FromStr for KeyState {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split_whitespace()
            .try_fold(KeyState::released(), |state, name| {
                Ok::<_, InputError>(state.with(name.parse()?))
            })
    }
}

pub trait KeySource: Send {
    fn sample(&mut self) -> KeyState;
}

/// Latest snapshot pushed through a channel. A closed channel reads as cancel.
pub struct LatchedKeys {
    rx: mpsc::Receiver<KeyState>,
    latest: KeyState,
}

impl LatchedKeys {
    pub fn new(rx: mpsc::Receiver<KeyState>) -> Self {
        Self {
            rx,
            latest: KeyState::released(),
        }
    }
}

impl KeySource for LatchedKeys {
    fn sample(&mut self) -> KeyState {
        loop {
            match self.rx.try_recv() {
                Ok(state) => self.latest = state,
                Err(mpsc::error::TryRecvError::Empty) => return self.latest,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    return KeyState::of(&[Key::Cancel]);
                }
            }
        }
    }
}

pub struct ScriptedKeys {
    script: VecDeque<KeyState>,
    last: KeyState,
}

impl ScriptedKeys {
    pub fn new(script: impl IntoIterator<Item = KeyState>) -> Self {
        Self {
            script: script.into_iter().collect(),
            last: KeyState::released(),
        }
    }
}

impl KeySource for ScriptedKeys {
    fn sample(&mut self) -> KeyState {
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        self.last
    }
}
